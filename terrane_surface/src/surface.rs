// Copyright 2026 the Terrane Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Render surfaces: the per-frame contract between the scene and the screen.
//!
//! A render surface couples a [`NativeSurfaceHandle`] to an
//! [`EglContextManager`] and walks the lifecycle described in the
//! [crate docs](crate): `Uninitialized → EglInitialized → SurfaceCreated →
//! SurfaceDestroyed`, with `pre_render`/`post_render`/`replace_egl_surface`
//! self-looping on `SurfaceCreated`.
//!
//! The surface-variant set is closed and small, so variants are a
//! [`RenderSurface`] enum rather than an inheritance chain: [`Window`] adds
//! the move/resize protocol and the deiconify-approval handshake, [`Pixmap`]
//! adds a drawing lock acquired in `pre_render` — the documented asymmetry
//! between the variants (window surfaces have nothing to prepare).
//!
//! [`Window`]: RenderSurface::Window
//! [`Pixmap`]: RenderSurface::Pixmap

use terrane_core::trace::{SurfaceLifecycleEvent, SurfaceOp, Tracer};

use crate::egl::{EglApi, EglContextManager, EglSurfaceHandle, GlAbstraction};
use crate::native::{
    ColorDepth, NativeDisplayHandle, NativeSurfaceHandle, NativeWindowHandle, NativeWindowing,
    PositionSize,
};

/// Sub-threshold jitter along any axis is ignored by
/// [`WindowRenderSurface::move_resize`].
const MOVE_RESIZE_THRESHOLD: i32 = 1;

/// Lifecycle state of a render surface.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SurfaceState {
    /// Constructed; EGL untouched.
    Uninitialized,
    /// GLES initialized and a config chosen.
    EglInitialized,
    /// An EGL surface is bound; the surface can render.
    SurfaceCreated,
    /// The EGL surface was destroyed; terminal for this surface instance.
    SurfaceDestroyed,
}

/// Which variant a [`RenderSurface`] is.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SurfaceType {
    /// A window-backed surface.
    Window,
    /// A pixmap-backed surface.
    Pixmap,
}

/// What [`WindowRenderSurface::move_resize`] did.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MoveResizeOutcome {
    /// All deltas were at or below the threshold; no native call was issued
    /// and the logical geometry is unchanged.
    Unchanged,
    /// Only the position changed; one native move was issued.
    Moved,
    /// Only the size changed; one native resize was issued.
    Resized,
    /// Both changed; one combined native move+resize was issued.
    MovedResized,
    /// The native call failed; the logical geometry is unchanged.
    Failed,
}

/// A window-backed render surface.
///
/// Owns the platform connection and the native window handle exclusively; no
/// two render surfaces may bind the same native handle.
#[derive(Debug)]
pub struct WindowRenderSurface<P: NativeWindowing> {
    platform: P,
    native: NativeSurfaceHandle,
    title: String,
    is_transparent: bool,
    state: SurfaceState,
    pending_deiconify: bool,
}

impl<P: NativeWindowing> WindowRenderSurface<P> {
    /// Creates a window surface, allocating a new native window.
    ///
    /// Transparent surfaces get a 32-bit ARGB window, opaque ones 24-bit RGB.
    /// A zero width or height in `geometry` is substituted with the full
    /// screen size.
    ///
    /// # Panics
    ///
    /// Panics if the platform refuses to create the window (fatal; see
    /// [`NativeSurfaceHandle::create`]).
    #[must_use]
    pub fn new(
        mut platform: P,
        geometry: PositionSize,
        title: &str,
        is_transparent: bool,
    ) -> Self {
        let depth = if is_transparent {
            ColorDepth::Argb32
        } else {
            ColorDepth::Rgb24
        };
        let native = NativeSurfaceHandle::create(&mut platform, geometry, depth);
        platform.set_title(native.handle(), title);
        Self {
            platform,
            native,
            title: title.into(),
            is_transparent,
            state: SurfaceState::Uninitialized,
            pending_deiconify: false,
        }
    }

    /// Creates a window surface around a window supplied by the embedding
    /// application. The handle is not destroyed at teardown.
    #[must_use]
    pub fn adopt(
        platform: P,
        handle: NativeWindowHandle,
        geometry: PositionSize,
        title: &str,
        is_transparent: bool,
    ) -> Self {
        let depth = if is_transparent {
            ColorDepth::Argb32
        } else {
            ColorDepth::Rgb24
        };
        Self {
            platform,
            native: NativeSurfaceHandle::adopt(handle, geometry, depth),
            title: title.into(),
            is_transparent,
            state: SurfaceState::Uninitialized,
            pending_deiconify: false,
        }
    }

    /// Returns the native window handle.
    #[must_use]
    pub fn window(&self) -> NativeWindowHandle {
        self.native.handle()
    }

    /// Returns the logical geometry.
    #[must_use]
    pub fn position_size(&self) -> PositionSize {
        self.native.position_size()
    }

    /// Returns the window title.
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Returns whether the surface was created transparent.
    #[must_use]
    pub fn is_transparent(&self) -> bool {
        self.is_transparent
    }

    /// Returns the lifecycle state.
    #[must_use]
    pub fn state(&self) -> SurfaceState {
        self.state
    }

    /// Returns whether a deiconify approval is pending.
    #[must_use]
    pub fn deiconify_pending(&self) -> bool {
        self.pending_deiconify
    }

    /// Initializes GLES and chooses a config matching this surface's depth.
    ///
    /// # Panics
    ///
    /// Panics unless the surface is [`Uninitialized`](SurfaceState::Uninitialized).
    pub fn initialize_egl<E: EglApi>(
        &mut self,
        egl: &mut EglContextManager<E>,
        display: NativeDisplayHandle,
        tracer: &mut Tracer<'_>,
    ) {
        assert!(
            self.state == SurfaceState::Uninitialized,
            "initialize_egl called in state {:?}",
            self.state
        );
        egl.initialize_gles(display);
        egl.choose_config(true, self.native.color_depth());
        self.state = SurfaceState::EglInitialized;
        tracer.surface_lifecycle(&SurfaceLifecycleEvent {
            op: SurfaceOp::EglInitialized,
        });
    }

    /// Binds an EGL surface to the native window.
    ///
    /// # Panics
    ///
    /// Panics unless EGL was initialized first.
    pub fn create_egl_surface<E: EglApi>(
        &mut self,
        egl: &mut EglContextManager<E>,
        tracer: &mut Tracer<'_>,
    ) -> EglSurfaceHandle {
        assert!(
            self.state == SurfaceState::EglInitialized,
            "create_egl_surface called in state {:?}",
            self.state
        );
        let surface = egl.create_surface_window(self.native.handle(), self.native.color_depth());
        self.state = SurfaceState::SurfaceCreated;
        tracer.surface_lifecycle(&SurfaceLifecycleEvent {
            op: SurfaceOp::SurfaceCreated,
        });
        surface
    }

    /// Atomically swaps the bound EGL surface, e.g. after a resize that
    /// requires a new one.
    ///
    /// Returns `false` if recreation failed; the surface stays in
    /// [`SurfaceCreated`](SurfaceState::SurfaceCreated) but the context
    /// manager reports no current surface until a retry succeeds.
    ///
    /// # Panics
    ///
    /// Panics unless an EGL surface was created.
    #[must_use]
    pub fn replace_egl_surface<E: EglApi>(
        &mut self,
        egl: &mut EglContextManager<E>,
        display: NativeDisplayHandle,
        tracer: &mut Tracer<'_>,
    ) -> bool {
        assert!(
            self.state == SurfaceState::SurfaceCreated,
            "replace_egl_surface called in state {:?}",
            self.state
        );
        let replaced = egl.replace_surface_window(self.native.handle(), display);
        if replaced {
            tracer.surface_lifecycle(&SurfaceLifecycleEvent {
                op: SurfaceOp::SurfaceReplaced,
            });
        }
        replaced
    }

    /// Destroys the EGL surface. Safe to call multiple times; the first call
    /// from [`SurfaceCreated`](SurfaceState::SurfaceCreated) is terminal.
    pub fn destroy_egl_surface<E: EglApi>(
        &mut self,
        egl: &mut EglContextManager<E>,
        tracer: &mut Tracer<'_>,
    ) {
        egl.destroy_surface();
        if self.state == SurfaceState::SurfaceCreated {
            self.state = SurfaceState::SurfaceDestroyed;
            tracer.surface_lifecycle(&SurfaceLifecycleEvent {
                op: SurfaceOp::SurfaceDestroyed,
            });
        }
    }

    /// Moves and/or resizes the native window, ignoring sub-threshold jitter.
    ///
    /// Each axis is compared independently against a one-unit threshold. If
    /// both position and size changed beyond it, one combined native
    /// move+resize is issued; if only one did, only that native call is
    /// issued; otherwise no native call happens at all. The logical geometry
    /// is updated only for the components whose native call succeeded, so a
    /// refused call leaves native and logical state consistent.
    pub fn move_resize(
        &mut self,
        new: PositionSize,
        tracer: &mut Tracer<'_>,
    ) -> MoveResizeOutcome {
        let current = self.native.position_size();
        let position_changed = (new.x - current.x).abs() > MOVE_RESIZE_THRESHOLD
            || (new.y - current.y).abs() > MOVE_RESIZE_THRESHOLD;
        let size_changed = (new.width - current.width).abs() > MOVE_RESIZE_THRESHOLD
            || (new.height - current.height).abs() > MOVE_RESIZE_THRESHOLD;
        let window = self.native.handle();

        match (position_changed, size_changed) {
            (false, false) => MoveResizeOutcome::Unchanged,
            (true, true) => {
                if self.platform.move_resize_window(window, new).is_err() {
                    return MoveResizeOutcome::Failed;
                }
                self.native.set_position_size(new);
                tracer.surface_lifecycle(&SurfaceLifecycleEvent {
                    op: SurfaceOp::MovedResized,
                });
                MoveResizeOutcome::MovedResized
            }
            (true, false) => {
                if self.platform.move_window(window, new.x, new.y).is_err() {
                    return MoveResizeOutcome::Failed;
                }
                self.native.set_position_size(PositionSize {
                    x: new.x,
                    y: new.y,
                    ..current
                });
                tracer.surface_lifecycle(&SurfaceLifecycleEvent {
                    op: SurfaceOp::Moved,
                });
                MoveResizeOutcome::Moved
            }
            (false, true) => {
                if self
                    .platform
                    .resize_window(window, new.width, new.height)
                    .is_err()
                {
                    return MoveResizeOutcome::Failed;
                }
                self.native.set_position_size(PositionSize {
                    width: new.width,
                    height: new.height,
                    ..current
                });
                tracer.surface_lifecycle(&SurfaceLifecycleEvent {
                    op: SurfaceOp::Resized,
                });
                MoveResizeOutcome::Resized
            }
        }
    }

    /// Makes the native window visible. Idempotent at the native layer.
    pub fn map(&mut self, tracer: &mut Tracer<'_>) {
        self.platform.show_window(self.native.handle());
        tracer.surface_lifecycle(&SurfaceLifecycleEvent {
            op: SurfaceOp::Mapped,
        });
    }

    /// Arms the deiconify-approval handshake.
    ///
    /// Called when the window manager restores the window from an iconified
    /// state; the approval is sent from the next
    /// [`post_render`](Self::post_render), after the redrawn frame is
    /// guaranteed visible.
    pub fn request_to_approve_deiconify(&mut self) {
        self.pending_deiconify = true;
    }

    /// Window surfaces have nothing to prepare before drawing.
    ///
    /// Present for symmetry with the pixmap variant, which acquires its
    /// drawing lock here.
    #[must_use]
    pub fn pre_render(&mut self) -> bool {
        true
    }

    /// Presents the frame, then completes a pending deiconify approval.
    ///
    /// Always swaps buffers first. If an approval is pending, the sequence
    /// is: GL finish (the swap is asynchronous, and the window manager must
    /// not learn of the redraw before it is actually visible), one approval
    /// client message addressed to the window, a display-server round trip,
    /// then the pending flag clears. The ordering is a hard correctness
    /// requirement of the handshake, not an optimization.
    ///
    /// # Panics
    ///
    /// Panics unless an EGL surface is live (GL-affecting calls outside the
    /// surface lifetime are contract violations).
    pub fn post_render<E: EglApi>(
        &mut self,
        egl: &mut EglContextManager<E>,
        gl: &mut dyn GlAbstraction,
        tracer: &mut Tracer<'_>,
    ) {
        assert!(
            self.state == SurfaceState::SurfaceCreated,
            "post_render called in state {:?}",
            self.state
        );
        egl.swap_buffers();

        if self.pending_deiconify {
            gl.finish();
            self.platform.send_deiconify_approval(self.native.handle());
            self.platform.sync();
            self.pending_deiconify = false;
            tracer.surface_lifecycle(&SurfaceLifecycleEvent {
                op: SurfaceOp::DeiconifyApproved,
            });
        }
    }
}

impl<P: NativeWindowing> Drop for WindowRenderSurface<P> {
    fn drop(&mut self) {
        let Self {
            platform, native, ..
        } = self;
        native.teardown(platform);
    }
}

/// A pixmap-backed render surface.
///
/// Pixmaps are always supplied by the embedding application; unlike windows
/// they cannot be moved or mapped, and drawing requires holding the surface
/// lock acquired in [`pre_render`](Self::pre_render).
#[derive(Debug)]
pub struct PixmapRenderSurface<P: NativeWindowing> {
    platform: P,
    native: NativeSurfaceHandle,
    state: SurfaceState,
    locked: bool,
}

impl<P: NativeWindowing> PixmapRenderSurface<P> {
    /// Wraps an application-supplied pixmap.
    #[must_use]
    pub fn adopt(
        platform: P,
        handle: NativeWindowHandle,
        geometry: PositionSize,
        depth: ColorDepth,
    ) -> Self {
        Self {
            platform,
            native: NativeSurfaceHandle::adopt(handle, geometry, depth),
            state: SurfaceState::Uninitialized,
            locked: false,
        }
    }

    /// Returns the native pixmap handle.
    #[must_use]
    pub fn pixmap(&self) -> NativeWindowHandle {
        self.native.handle()
    }

    /// Returns the logical geometry.
    #[must_use]
    pub fn position_size(&self) -> PositionSize {
        self.native.position_size()
    }

    /// Returns the lifecycle state.
    #[must_use]
    pub fn state(&self) -> SurfaceState {
        self.state
    }

    /// Initializes GLES and chooses a pixmap config.
    ///
    /// # Panics
    ///
    /// Panics unless the surface is [`Uninitialized`](SurfaceState::Uninitialized).
    pub fn initialize_egl<E: EglApi>(
        &mut self,
        egl: &mut EglContextManager<E>,
        display: NativeDisplayHandle,
        tracer: &mut Tracer<'_>,
    ) {
        assert!(
            self.state == SurfaceState::Uninitialized,
            "initialize_egl called in state {:?}",
            self.state
        );
        egl.initialize_gles(display);
        egl.choose_config(false, self.native.color_depth());
        self.state = SurfaceState::EglInitialized;
        tracer.surface_lifecycle(&SurfaceLifecycleEvent {
            op: SurfaceOp::EglInitialized,
        });
    }

    /// Binds an EGL surface to the pixmap.
    ///
    /// # Panics
    ///
    /// Panics unless EGL was initialized first.
    pub fn create_egl_surface<E: EglApi>(
        &mut self,
        egl: &mut EglContextManager<E>,
        tracer: &mut Tracer<'_>,
    ) -> EglSurfaceHandle {
        assert!(
            self.state == SurfaceState::EglInitialized,
            "create_egl_surface called in state {:?}",
            self.state
        );
        let surface = egl.create_surface_pixmap(self.native.handle(), self.native.color_depth());
        self.state = SurfaceState::SurfaceCreated;
        tracer.surface_lifecycle(&SurfaceLifecycleEvent {
            op: SurfaceOp::SurfaceCreated,
        });
        surface
    }

    /// Destroys the EGL surface. Safe to call multiple times.
    pub fn destroy_egl_surface<E: EglApi>(
        &mut self,
        egl: &mut EglContextManager<E>,
        tracer: &mut Tracer<'_>,
    ) {
        egl.destroy_surface();
        if self.state == SurfaceState::SurfaceCreated {
            self.state = SurfaceState::SurfaceDestroyed;
            tracer.surface_lifecycle(&SurfaceLifecycleEvent {
                op: SurfaceOp::SurfaceDestroyed,
            });
        }
    }

    /// Acquires the drawing lock.
    pub fn pre_render(&mut self) -> bool {
        self.locked = true;
        true
    }

    /// Releases the drawing lock.
    ///
    /// Pixmap surfaces have no back buffer to swap; the display-server round
    /// trip makes the drawn content observable to the consumer.
    ///
    /// # Panics
    ///
    /// Panics unless an EGL surface is live.
    pub fn post_render(&mut self, gl: &mut dyn GlAbstraction) {
        assert!(
            self.state == SurfaceState::SurfaceCreated,
            "post_render called in state {:?}",
            self.state
        );
        gl.finish();
        self.platform.sync();
        self.locked = false;
    }

    /// Returns whether the drawing lock is held.
    #[must_use]
    pub fn is_locked(&self) -> bool {
        self.locked
    }
}

/// The closed set of render-surface variants.
///
/// Dispatches the shared capability interface; operations that only make
/// sense for one variant (move/resize, mapping, the deiconify handshake) are
/// contract violations on the other.
#[derive(Debug)]
pub enum RenderSurface<P: NativeWindowing> {
    /// A window-backed surface.
    Window(WindowRenderSurface<P>),
    /// A pixmap-backed surface.
    Pixmap(PixmapRenderSurface<P>),
}

impl<P: NativeWindowing> RenderSurface<P> {
    /// Returns which variant this is.
    #[must_use]
    pub fn surface_type(&self) -> SurfaceType {
        match self {
            Self::Window(_) => SurfaceType::Window,
            Self::Pixmap(_) => SurfaceType::Pixmap,
        }
    }

    /// Returns the native drawable handle (window or pixmap).
    #[must_use]
    pub fn drawable(&self) -> NativeWindowHandle {
        match self {
            Self::Window(w) => w.window(),
            Self::Pixmap(p) => p.pixmap(),
        }
    }

    /// Returns the logical geometry.
    #[must_use]
    pub fn position_size(&self) -> PositionSize {
        match self {
            Self::Window(w) => w.position_size(),
            Self::Pixmap(p) => p.position_size(),
        }
    }

    /// Returns the lifecycle state.
    #[must_use]
    pub fn state(&self) -> SurfaceState {
        match self {
            Self::Window(w) => w.state(),
            Self::Pixmap(p) => p.state(),
        }
    }

    /// Initializes GLES for this surface.
    pub fn initialize_egl<E: EglApi>(
        &mut self,
        egl: &mut EglContextManager<E>,
        display: NativeDisplayHandle,
        tracer: &mut Tracer<'_>,
    ) {
        match self {
            Self::Window(w) => w.initialize_egl(egl, display, tracer),
            Self::Pixmap(p) => p.initialize_egl(egl, display, tracer),
        }
    }

    /// Creates the EGL surface for this drawable.
    pub fn create_egl_surface<E: EglApi>(
        &mut self,
        egl: &mut EglContextManager<E>,
        tracer: &mut Tracer<'_>,
    ) -> EglSurfaceHandle {
        match self {
            Self::Window(w) => w.create_egl_surface(egl, tracer),
            Self::Pixmap(p) => p.create_egl_surface(egl, tracer),
        }
    }

    /// Destroys the EGL surface. Safe to call multiple times.
    pub fn destroy_egl_surface<E: EglApi>(
        &mut self,
        egl: &mut EglContextManager<E>,
        tracer: &mut Tracer<'_>,
    ) {
        match self {
            Self::Window(w) => w.destroy_egl_surface(egl, tracer),
            Self::Pixmap(p) => p.destroy_egl_surface(egl, tracer),
        }
    }

    /// Prepares for drawing. Window surfaces have nothing to prepare; the
    /// pixmap variant acquires its drawing lock.
    pub fn pre_render(&mut self) -> bool {
        match self {
            Self::Window(w) => w.pre_render(),
            Self::Pixmap(p) => p.pre_render(),
        }
    }

    /// Atomically swaps the bound EGL surface.
    ///
    /// # Panics
    ///
    /// Panics on a pixmap surface; replacement is a window-surface protocol.
    #[must_use]
    pub fn replace_egl_surface<E: EglApi>(
        &mut self,
        egl: &mut EglContextManager<E>,
        display: NativeDisplayHandle,
        tracer: &mut Tracer<'_>,
    ) -> bool {
        match self {
            Self::Window(w) => w.replace_egl_surface(egl, display, tracer),
            Self::Pixmap(_) => panic!("pixmap surfaces do not support surface replacement"),
        }
    }

    /// Moves and/or resizes the native window.
    ///
    /// # Panics
    ///
    /// Panics on a pixmap surface; pixmaps have no window-manager geometry.
    pub fn move_resize(
        &mut self,
        new: PositionSize,
        tracer: &mut Tracer<'_>,
    ) -> MoveResizeOutcome {
        match self {
            Self::Window(w) => w.move_resize(new, tracer),
            Self::Pixmap(_) => panic!("pixmap surfaces cannot be moved or resized"),
        }
    }

    /// Makes the native window visible.
    ///
    /// # Panics
    ///
    /// Panics on a pixmap surface; pixmaps are never mapped.
    pub fn map(&mut self, tracer: &mut Tracer<'_>) {
        match self {
            Self::Window(w) => w.map(tracer),
            Self::Pixmap(_) => panic!("pixmap surfaces cannot be mapped"),
        }
    }

    /// Arms the deiconify-approval handshake.
    ///
    /// # Panics
    ///
    /// Panics on a pixmap surface; the handshake is a window-manager
    /// protocol.
    pub fn request_to_approve_deiconify(&mut self) {
        match self {
            Self::Window(w) => w.request_to_approve_deiconify(),
            Self::Pixmap(_) => panic!("deiconify approval is a window-surface protocol"),
        }
    }

    /// Presents the frame (window: swap plus any pending deiconify approval;
    /// pixmap: finish, sync, and release the drawing lock).
    pub fn post_render<E: EglApi>(
        &mut self,
        egl: &mut EglContextManager<E>,
        gl: &mut dyn GlAbstraction,
        tracer: &mut Tracer<'_>,
    ) {
        match self {
            Self::Window(w) => w.post_render(egl, gl, tracer),
            Self::Pixmap(p) => p.post_render(gl),
        }
    }
}
