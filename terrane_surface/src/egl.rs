// Copyright 2026 the Terrane Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! EGL context and surface lifecycle.
//!
//! [`EglContextManager`] owns the EGL display/config/context state for one
//! render surface and enforces the lifecycle ordering:
//!
//! ```text
//! initialize_gles ──► choose_config ──► create_surface_window
//!                                            │
//!                      replace_surface_window (0..n, destroys prior first)
//!                                            │
//!                                     destroy_surface
//! ```
//!
//! Exactly one live EGL surface exists per render surface at a time, and a
//! GL-affecting call (swap, draw) without a live current surface is a
//! contract violation. Surface *replacement* failure is recoverable: the
//! manager is left in a detectable surface-lost state with nothing partially
//! bound to the GL context, and the caller decides whether to retry.
//!
//! The concrete EGL and GL entry points are injected via [`EglApi`] and
//! [`GlAbstraction`] so the state machine runs under test doubles.

use std::fmt;

use crate::native::{ColorDepth, NativeDisplayHandle, NativeWindowHandle};

/// An opaque EGL surface handle returned by the driver.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct EglSurfaceHandle(pub usize);

impl fmt::Debug for EglSurfaceHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EglSurfaceHandle({:#x})", self.0)
    }
}

/// A failed EGL call.
#[derive(Debug)]
pub struct EglError {
    /// Name of the failed EGL call, for diagnostics.
    pub call: &'static str,
}

impl fmt::Display for EglError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EGL call failed: {}", self.call)
    }
}

impl std::error::Error for EglError {}

/// The EGL entry points consumed by [`EglContextManager`].
pub trait EglApi {
    /// Initializes EGL against a native display. Safe to call again with the
    /// same display during surface replacement.
    fn initialize(&mut self, display: NativeDisplayHandle) -> Result<(), EglError>;

    /// Selects a config matching the surface kind and color depth.
    fn choose_config(
        &mut self,
        is_window_surface: bool,
        depth: ColorDepth,
    ) -> Result<(), EglError>;

    /// Binds an EGL surface to a native window.
    fn create_window_surface(
        &mut self,
        window: NativeWindowHandle,
        depth: ColorDepth,
    ) -> Result<EglSurfaceHandle, EglError>;

    /// Binds an EGL surface to a native pixmap.
    fn create_pixmap_surface(
        &mut self,
        pixmap: NativeWindowHandle,
        depth: ColorDepth,
    ) -> Result<EglSurfaceHandle, EglError>;

    /// Releases an EGL surface.
    fn destroy_surface(&mut self, surface: EglSurfaceHandle);

    /// Makes a surface current on the context.
    fn make_current(&mut self, surface: EglSurfaceHandle) -> Result<(), EglError>;

    /// Presents the back buffer of a surface.
    fn swap_buffers(&mut self, surface: EglSurfaceHandle);
}

/// The GL entry points the surface layer touches directly.
pub trait GlAbstraction {
    /// Blocks until the GL pipeline has fully executed.
    fn finish(&mut self);
}

/// Owns the EGL display/config/context state for one render surface.
#[derive(Debug)]
pub struct EglContextManager<E: EglApi> {
    pub(crate) api: E,
    display: Option<NativeDisplayHandle>,
    config_depth: Option<ColorDepth>,
    current_surface: Option<EglSurfaceHandle>,
}

impl<E: EglApi> EglContextManager<E> {
    /// Creates a manager over the given EGL implementation.
    #[must_use]
    pub fn new(api: E) -> Self {
        Self {
            api,
            display: None,
            config_depth: None,
            current_surface: None,
        }
    }

    /// Initializes GLES against the native display.
    ///
    /// Must be called exactly once, before any config or surface call. A
    /// second call is a caller error, not a runtime condition.
    ///
    /// # Panics
    ///
    /// Panics on a repeated call, or if the driver refuses initialization
    /// (GUI bring-up cannot proceed).
    pub fn initialize_gles(&mut self, display: NativeDisplayHandle) {
        assert!(
            self.display.is_none(),
            "initialize_gles must be called exactly once"
        );
        if let Err(err) = self.api.initialize(display) {
            panic!("failed to initialize EGL: {err}");
        }
        self.display = Some(display);
    }

    /// Selects the EGL config for the requested surface kind and depth.
    ///
    /// # Panics
    ///
    /// Panics if called before [`initialize_gles`](Self::initialize_gles), or
    /// if no matching config exists.
    pub fn choose_config(&mut self, is_window_surface: bool, depth: ColorDepth) {
        assert!(
            self.display.is_some(),
            "choose_config requires initialize_gles first"
        );
        if let Err(err) = self.api.choose_config(is_window_surface, depth) {
            panic!("no EGL config for depth {depth:?}: {err}");
        }
        self.config_depth = Some(depth);
    }

    /// Binds an EGL surface to the native window and makes it current.
    ///
    /// # Panics
    ///
    /// Panics if no config was chosen, if a surface is already live (exactly
    /// one live EGL surface per render surface), or if the driver refuses
    /// the initial surface (bring-up failure).
    pub fn create_surface_window(
        &mut self,
        window: NativeWindowHandle,
        depth: ColorDepth,
    ) -> EglSurfaceHandle {
        assert!(
            self.config_depth.is_some(),
            "create_surface_window requires choose_config first"
        );
        assert!(
            self.current_surface.is_none(),
            "an EGL surface is already live; destroy or replace it instead"
        );

        let surface = match self.api.create_window_surface(window, depth) {
            Ok(surface) => surface,
            Err(err) => panic!("failed to create EGL window surface: {err}"),
        };
        if let Err(err) = self.api.make_current(surface) {
            panic!("failed to make EGL surface current: {err}");
        }
        self.current_surface = Some(surface);
        surface
    }

    /// Replaces the live surface with one bound to the (possibly resized)
    /// native window.
    ///
    /// The prior surface is destroyed first, then GLES is re-initialized
    /// against the same display and a new surface is created. Returns `false`
    /// if recreation fails; the manager is then in a surface-lost state
    /// ([`has_current_surface`](Self::has_current_surface) returns `false`)
    /// with nothing partially bound, and the caller may retry.
    #[must_use]
    pub fn replace_surface_window(
        &mut self,
        window: NativeWindowHandle,
        display: NativeDisplayHandle,
    ) -> bool {
        let Some(depth) = self.config_depth else {
            panic!("replace_surface_window requires a chosen config");
        };

        self.destroy_surface();

        if self.api.initialize(display).is_err() {
            return false;
        }
        let Ok(surface) = self.api.create_window_surface(window, depth) else {
            return false;
        };
        if self.api.make_current(surface).is_err() {
            self.api.destroy_surface(surface);
            return false;
        }
        self.current_surface = Some(surface);
        true
    }

    /// Releases the live surface. Safe to call when none exists.
    pub fn destroy_surface(&mut self) {
        if let Some(surface) = self.current_surface.take() {
            self.api.destroy_surface(surface);
        }
    }

    /// Presents the current back buffer.
    ///
    /// # Panics
    ///
    /// Panics if no surface is live — a GL-affecting call must never be
    /// issued without a valid current surface.
    pub fn swap_buffers(&mut self) {
        let Some(surface) = self.current_surface else {
            panic!("swap_buffers requires a live EGL surface");
        };
        self.api.swap_buffers(surface);
    }

    /// Returns whether a surface is currently live.
    #[must_use]
    pub fn has_current_surface(&self) -> bool {
        self.current_surface.is_some()
    }

    /// Returns the live surface handle, if any.
    #[must_use]
    pub fn current_surface(&self) -> Option<EglSurfaceHandle> {
        self.current_surface
    }

    /// Binds an EGL surface to a native pixmap and makes it current.
    ///
    /// The pixmap counterpart of
    /// [`create_surface_window`](Self::create_surface_window); same contract.
    pub fn create_surface_pixmap(
        &mut self,
        pixmap: NativeWindowHandle,
        depth: ColorDepth,
    ) -> EglSurfaceHandle {
        assert!(
            self.config_depth.is_some(),
            "create_surface_pixmap requires choose_config first"
        );
        assert!(
            self.current_surface.is_none(),
            "an EGL surface is already live; destroy or replace it instead"
        );

        let surface = match self.api.create_pixmap_surface(pixmap, depth) {
            Ok(surface) => surface,
            Err(err) => panic!("failed to create EGL pixmap surface: {err}"),
        };
        if let Err(err) = self.api.make_current(surface) {
            panic!("failed to make EGL surface current: {err}");
        }
        self.current_surface = Some(surface);
        surface
    }
}

#[cfg(test)]
pub(crate) mod mock {
    //! Recording doubles for [`EglApi`](super::EglApi) and
    //! [`GlAbstraction`](super::GlAbstraction).

    use crate::native::mock::CallLog;
    use crate::native::{ColorDepth, NativeDisplayHandle, NativeWindowHandle};

    use super::{EglApi, EglError, EglSurfaceHandle, GlAbstraction};

    pub(crate) struct MockEgl {
        pub(crate) log: CallLog,
        pub(crate) next_surface: usize,
        pub(crate) fail_create_surface: bool,
        pub(crate) fail_initialize: bool,
        pub(crate) live_surfaces: usize,
    }

    impl MockEgl {
        pub(crate) fn new(log: CallLog) -> Self {
            Self {
                log,
                next_surface: 0x100,
                fail_create_surface: false,
                fail_initialize: false,
                live_surfaces: 0,
            }
        }
    }

    impl EglApi for MockEgl {
        fn initialize(&mut self, _display: NativeDisplayHandle) -> Result<(), EglError> {
            if self.fail_initialize {
                return Err(EglError {
                    call: "display-init",
                });
            }
            self.log.borrow_mut().push("egl_initialize".into());
            Ok(())
        }

        fn choose_config(
            &mut self,
            is_window_surface: bool,
            depth: ColorDepth,
        ) -> Result<(), EglError> {
            self.log
                .borrow_mut()
                .push(format!("choose_config(window={is_window_surface},{depth:?})"));
            Ok(())
        }

        fn create_window_surface(
            &mut self,
            _window: NativeWindowHandle,
            _depth: ColorDepth,
        ) -> Result<EglSurfaceHandle, EglError> {
            if self.fail_create_surface {
                return Err(EglError {
                    call: "surface-create",
                });
            }
            let surface = EglSurfaceHandle(self.next_surface);
            self.next_surface += 1;
            self.live_surfaces += 1;
            self.log
                .borrow_mut()
                .push(format!("create_surface({:#x})", surface.0));
            Ok(surface)
        }

        fn create_pixmap_surface(
            &mut self,
            pixmap: NativeWindowHandle,
            depth: ColorDepth,
        ) -> Result<EglSurfaceHandle, EglError> {
            self.create_window_surface(pixmap, depth)
        }

        fn destroy_surface(&mut self, surface: EglSurfaceHandle) {
            self.live_surfaces -= 1;
            self.log
                .borrow_mut()
                .push(format!("destroy_surface({:#x})", surface.0));
        }

        fn make_current(&mut self, _surface: EglSurfaceHandle) -> Result<(), EglError> {
            self.log.borrow_mut().push("make_current".into());
            Ok(())
        }

        fn swap_buffers(&mut self, _surface: EglSurfaceHandle) {
            self.log.borrow_mut().push("swap_buffers".into());
        }
    }

    pub(crate) struct MockGl {
        pub(crate) log: CallLog,
    }

    impl GlAbstraction for MockGl {
        fn finish(&mut self) {
            self.log.borrow_mut().push("gl_finish".into());
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::mock::MockEgl;
    use super::*;

    fn manager() -> EglContextManager<MockEgl> {
        let log = Rc::new(RefCell::new(Vec::new()));
        EglContextManager::new(MockEgl::new(log))
    }

    fn initialized_manager() -> EglContextManager<MockEgl> {
        let mut egl = manager();
        egl.initialize_gles(NativeDisplayHandle(0x1));
        egl.choose_config(true, ColorDepth::Argb32);
        egl
    }

    #[test]
    fn full_lifecycle_creates_and_destroys_one_surface() {
        let mut egl = initialized_manager();
        let surface = egl.create_surface_window(NativeWindowHandle(0x10), ColorDepth::Argb32);
        assert!(egl.has_current_surface());
        assert_eq!(egl.current_surface(), Some(surface));

        egl.swap_buffers();
        egl.destroy_surface();
        assert!(!egl.has_current_surface());
        assert_eq!(egl.api.live_surfaces, 0, "no leaked driver surfaces");
    }

    #[test]
    #[should_panic(expected = "exactly once")]
    fn double_initialize_is_a_contract_violation() {
        let mut egl = manager();
        egl.initialize_gles(NativeDisplayHandle(0x1));
        egl.initialize_gles(NativeDisplayHandle(0x1));
    }

    #[test]
    #[should_panic(expected = "requires initialize_gles first")]
    fn choose_config_before_initialize_panics() {
        let mut egl = manager();
        egl.choose_config(true, ColorDepth::Rgb24);
    }

    #[test]
    #[should_panic(expected = "requires choose_config first")]
    fn create_surface_before_config_panics() {
        let mut egl = manager();
        egl.initialize_gles(NativeDisplayHandle(0x1));
        let _ = egl.create_surface_window(NativeWindowHandle(0x10), ColorDepth::Rgb24);
    }

    #[test]
    #[should_panic(expected = "already live")]
    fn second_live_surface_is_a_contract_violation() {
        let mut egl = initialized_manager();
        let _ = egl.create_surface_window(NativeWindowHandle(0x10), ColorDepth::Argb32);
        let _ = egl.create_surface_window(NativeWindowHandle(0x11), ColorDepth::Argb32);
    }

    #[test]
    #[should_panic(expected = "requires a live EGL surface")]
    fn swap_without_surface_is_a_contract_violation() {
        let mut egl = initialized_manager();
        egl.swap_buffers();
    }

    #[test]
    fn destroy_surface_is_idempotent() {
        let mut egl = initialized_manager();
        let _ = egl.create_surface_window(NativeWindowHandle(0x10), ColorDepth::Argb32);
        egl.destroy_surface();
        egl.destroy_surface();
        assert_eq!(egl.api.live_surfaces, 0);
    }

    #[test]
    fn replace_destroys_prior_surface_first() {
        let mut egl = initialized_manager();
        let first = egl.create_surface_window(NativeWindowHandle(0x10), ColorDepth::Argb32);

        assert!(egl.replace_surface_window(NativeWindowHandle(0x10), NativeDisplayHandle(0x1)));
        let second = egl.current_surface().expect("replacement surface is live");
        assert_ne!(first, second);
        assert_eq!(egl.api.live_surfaces, 1, "old surface was destroyed");

        let log = egl.api.log.borrow();
        let destroy_pos = log
            .iter()
            .position(|c| c.starts_with("destroy_surface"))
            .expect("destroy logged");
        let create_pos = log
            .iter()
            .rposition(|c| c.starts_with("create_surface"))
            .expect("create logged");
        assert!(destroy_pos < create_pos, "destroy precedes recreation");
    }

    #[test]
    fn failed_replace_leaves_detectable_surface_lost_state() {
        let mut egl = initialized_manager();
        let _ = egl.create_surface_window(NativeWindowHandle(0x10), ColorDepth::Argb32);

        egl.api.fail_create_surface = true;
        assert!(!egl.replace_surface_window(NativeWindowHandle(0x10), NativeDisplayHandle(0x1)));
        assert!(
            !egl.has_current_surface(),
            "surface-lost state must be detectable"
        );
        assert_eq!(egl.api.live_surfaces, 0, "nothing left partially bound");

        // The caller can retry once the driver recovers.
        egl.api.fail_create_surface = false;
        assert!(egl.replace_surface_window(NativeWindowHandle(0x10), NativeDisplayHandle(0x1)));
        assert!(egl.has_current_surface());
    }

    #[test]
    fn failed_reinitialize_reports_failure() {
        let mut egl = initialized_manager();
        let _ = egl.create_surface_window(NativeWindowHandle(0x10), ColorDepth::Argb32);

        egl.api.fail_initialize = true;
        assert!(!egl.replace_surface_window(NativeWindowHandle(0x10), NativeDisplayHandle(0x1)));
        assert!(!egl.has_current_surface());
    }
}
