// Copyright 2026 the Terrane Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Native window handles and the platform windowing contract.

use std::env;
use std::fmt;

/// A native window (or pixmap) handle.
///
/// Stored as `usize` so the handle is pointer-width on every platform; a
/// 64-bit display server handle must never be truncated through a 32-bit
/// intermediate.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct NativeWindowHandle(pub usize);

impl fmt::Debug for NativeWindowHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NativeWindowHandle({:#x})", self.0)
    }
}

/// A native display-connection handle, passed through to EGL initialization.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct NativeDisplayHandle(pub usize);

impl fmt::Debug for NativeDisplayHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NativeDisplayHandle({:#x})", self.0)
    }
}

/// Color depth of a native window and its matching EGL config.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ColorDepth {
    /// 24-bit RGB.
    Rgb24,
    /// 32-bit ARGB (required for transparent windows).
    Argb32,
}

/// Integer window geometry: position and size in native units.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct PositionSize {
    /// Left edge.
    pub x: i32,
    /// Top edge.
    pub y: i32,
    /// Width.
    pub width: i32,
    /// Height.
    pub height: i32,
}

impl PositionSize {
    /// Creates a geometry value.
    #[must_use]
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }
}

/// A failed native windowing call.
#[derive(Debug)]
pub struct NativeError {
    /// Name of the failed native call, for diagnostics.
    pub call: &'static str,
}

impl fmt::Display for NativeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "native call failed: {}", self.call)
    }
}

impl std::error::Error for NativeError {}

/// Window-manager hints applied at window creation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct WindowHints {
    /// Whether the window accepts input focus.
    pub accepts_focus: bool,
    /// Whether the window starts iconified.
    pub start_iconified: bool,
}

impl Default for WindowHints {
    fn default() -> Self {
        Self {
            accepts_focus: true,
            start_iconified: false,
        }
    }
}

/// The windowing calls consumed from the platform.
///
/// A backend crate implements this against the real display server (window
/// properties via the ICCCM and NETWM conventions, the deiconify approval as
/// a client message addressed to the window itself). Tests use doubles.
pub trait NativeWindowing {
    /// Returns the full screen size in native units.
    fn screen_size(&self) -> (u32, u32);

    /// Allocates a native window with the given geometry and color depth.
    fn create_window(
        &mut self,
        geometry: PositionSize,
        depth: ColorDepth,
    ) -> Result<NativeWindowHandle, NativeError>;

    /// Destroys a native window.
    fn destroy_window(&mut self, window: NativeWindowHandle);

    /// Moves a window.
    fn move_window(&mut self, window: NativeWindowHandle, x: i32, y: i32)
    -> Result<(), NativeError>;

    /// Resizes a window.
    fn resize_window(
        &mut self,
        window: NativeWindowHandle,
        width: i32,
        height: i32,
    ) -> Result<(), NativeError>;

    /// Moves and resizes a window in a single native round trip.
    fn move_resize_window(
        &mut self,
        window: NativeWindowHandle,
        geometry: PositionSize,
    ) -> Result<(), NativeError>;

    /// Makes a window visible. Idempotent at the native layer.
    fn show_window(&mut self, window: NativeWindowHandle);

    /// Sets the window title (ICCCM name and NETWM visible name).
    fn set_title(&mut self, window: NativeWindowHandle, title: &str);

    /// Sets the startup-notification id property.
    fn set_startup_id(&mut self, window: NativeWindowHandle, id: &str);

    /// Applies window-manager hints.
    fn set_hints(&mut self, window: NativeWindowHandle, hints: WindowHints);

    /// Sends the deiconify-approval client message to the window itself.
    fn send_deiconify_approval(&mut self, window: NativeWindowHandle);

    /// Issues a synchronization round trip with the display server.
    fn sync(&mut self);
}

/// An owned or adopted native window handle plus its logical geometry.
///
/// If [`owns_handle`](Self::owns_handle) is true the handle is destroyed
/// exactly once, when the owning render surface is dropped.
#[derive(Debug)]
pub struct NativeSurfaceHandle {
    handle: NativeWindowHandle,
    owns_handle: bool,
    color_depth: ColorDepth,
    position_size: PositionSize,
}

impl NativeSurfaceHandle {
    /// Allocates a new native window.
    ///
    /// A zero width or height is substituted with the full screen size. The
    /// window-manager hints and, when the `DESKTOP_STARTUP_ID` environment
    /// variable is set, the startup-notification id are applied immediately
    /// (an absent variable is not an error).
    ///
    /// # Panics
    ///
    /// Panics if the platform refuses to create the window. GUI bring-up
    /// cannot proceed without a drawable, so this is not recoverable.
    pub fn create(
        platform: &mut impl NativeWindowing,
        geometry: PositionSize,
        depth: ColorDepth,
    ) -> Self {
        let mut geometry = geometry;
        if geometry.width == 0 || geometry.height == 0 {
            let (screen_width, screen_height) = platform.screen_size();
            geometry.width = i32::try_from(screen_width).unwrap_or(i32::MAX);
            geometry.height = i32::try_from(screen_height).unwrap_or(i32::MAX);
        }

        let handle = match platform.create_window(geometry, depth) {
            Ok(handle) => handle,
            Err(err) => panic!("failed to create native window: {err}"),
        };

        platform.set_hints(handle, WindowHints::default());
        if let Ok(startup_id) = env::var("DESKTOP_STARTUP_ID")
            && !startup_id.is_empty()
        {
            platform.set_startup_id(handle, &startup_id);
        }

        Self {
            handle,
            owns_handle: true,
            color_depth: depth,
            position_size: geometry,
        }
    }

    /// Wraps a handle supplied by the embedding application.
    ///
    /// The handle is not destroyed at teardown.
    #[must_use]
    pub fn adopt(handle: NativeWindowHandle, geometry: PositionSize, depth: ColorDepth) -> Self {
        Self {
            handle,
            owns_handle: false,
            color_depth: depth,
            position_size: geometry,
        }
    }

    /// Returns the native handle.
    #[must_use]
    pub fn handle(&self) -> NativeWindowHandle {
        self.handle
    }

    /// Returns whether this surface owns (and will destroy) the handle.
    #[must_use]
    pub fn owns_handle(&self) -> bool {
        self.owns_handle
    }

    /// Returns the color depth.
    #[must_use]
    pub fn color_depth(&self) -> ColorDepth {
        self.color_depth
    }

    /// Returns the logical geometry.
    #[must_use]
    pub fn position_size(&self) -> PositionSize {
        self.position_size
    }

    /// Updates the logical geometry. Only the move/resize protocol calls
    /// this, after the corresponding native call succeeded.
    pub(crate) fn set_position_size(&mut self, geometry: PositionSize) {
        self.position_size = geometry;
    }

    /// Destroys the handle if owned. Called exactly once, from the owning
    /// surface's teardown.
    pub(crate) fn teardown(&mut self, platform: &mut impl NativeWindowing) {
        if self.owns_handle {
            platform.destroy_window(self.handle);
            self.owns_handle = false;
        }
    }
}

#[cfg(test)]
pub(crate) mod mock {
    //! A recording double for [`NativeWindowing`](super::NativeWindowing).

    use std::cell::RefCell;
    use std::rc::Rc;

    use super::{
        ColorDepth, NativeError, NativeWindowHandle, NativeWindowing, PositionSize, WindowHints,
    };

    /// Shared ordered log of native (and GL) calls, by name.
    pub(crate) type CallLog = Rc<RefCell<Vec<String>>>;

    pub(crate) struct MockPlatform {
        pub(crate) log: CallLog,
        pub(crate) screen: (u32, u32),
        pub(crate) next_handle: usize,
        pub(crate) fail_create: bool,
        pub(crate) fail_move: bool,
        pub(crate) visible: bool,
    }

    impl MockPlatform {
        pub(crate) fn new() -> Self {
            Self {
                log: Rc::new(RefCell::new(Vec::new())),
                screen: (800, 600),
                next_handle: 0x1000,
                fail_create: false,
                fail_move: false,
                visible: false,
            }
        }

        pub(crate) fn with_log(log: CallLog) -> Self {
            Self {
                log,
                ..Self::new()
            }
        }

        pub(crate) fn calls(&self) -> Vec<String> {
            self.log.borrow().clone()
        }
    }

    impl NativeWindowing for MockPlatform {
        fn screen_size(&self) -> (u32, u32) {
            self.screen
        }

        fn create_window(
            &mut self,
            geometry: PositionSize,
            depth: ColorDepth,
        ) -> Result<NativeWindowHandle, NativeError> {
            if self.fail_create {
                return Err(NativeError {
                    call: "window-create",
                });
            }
            self.log.borrow_mut().push(format!(
                "create({},{},{},{},{:?})",
                geometry.x, geometry.y, geometry.width, geometry.height, depth
            ));
            let handle = NativeWindowHandle(self.next_handle);
            self.next_handle += 1;
            Ok(handle)
        }

        fn destroy_window(&mut self, window: NativeWindowHandle) {
            self.log.borrow_mut().push(format!("destroy({:#x})", window.0));
        }

        fn move_window(
            &mut self,
            _window: NativeWindowHandle,
            x: i32,
            y: i32,
        ) -> Result<(), NativeError> {
            if self.fail_move {
                return Err(NativeError {
                    call: "window-move",
                });
            }
            self.log.borrow_mut().push(format!("move({x},{y})"));
            Ok(())
        }

        fn resize_window(
            &mut self,
            _window: NativeWindowHandle,
            width: i32,
            height: i32,
        ) -> Result<(), NativeError> {
            self.log.borrow_mut().push(format!("resize({width},{height})"));
            Ok(())
        }

        fn move_resize_window(
            &mut self,
            _window: NativeWindowHandle,
            geometry: PositionSize,
        ) -> Result<(), NativeError> {
            self.log.borrow_mut().push(format!(
                "move_resize({},{},{},{})",
                geometry.x, geometry.y, geometry.width, geometry.height
            ));
            Ok(())
        }

        fn show_window(&mut self, _window: NativeWindowHandle) {
            self.log.borrow_mut().push("show".into());
            self.visible = true;
        }

        fn set_title(&mut self, _window: NativeWindowHandle, title: &str) {
            self.log.borrow_mut().push(format!("set_title({title})"));
        }

        fn set_startup_id(&mut self, _window: NativeWindowHandle, id: &str) {
            self.log.borrow_mut().push(format!("set_startup_id({id})"));
        }

        fn set_hints(&mut self, _window: NativeWindowHandle, hints: WindowHints) {
            self.log
                .borrow_mut()
                .push(format!("set_hints(focus={})", hints.accepts_focus));
        }

        fn send_deiconify_approval(&mut self, _window: NativeWindowHandle) {
            self.log.borrow_mut().push("send_deiconify_approval".into());
        }

        fn sync(&mut self) {
            self.log.borrow_mut().push("sync".into());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::mock::MockPlatform;
    use super::*;

    #[test]
    fn zero_size_substitutes_screen_size() {
        let mut platform = MockPlatform::new();
        let surface = NativeSurfaceHandle::create(
            &mut platform,
            PositionSize::new(0, 0, 0, 0),
            ColorDepth::Argb32,
        );

        assert_eq!(surface.position_size(), PositionSize::new(0, 0, 800, 600));
        assert_eq!(surface.color_depth(), ColorDepth::Argb32);
        assert!(surface.owns_handle());
        assert!(
            platform.calls()[0].starts_with("create(0,0,800,600"),
            "window allocated at screen size: {:?}",
            platform.calls()
        );
    }

    #[test]
    fn explicit_size_is_used_as_given() {
        let mut platform = MockPlatform::new();
        let surface = NativeSurfaceHandle::create(
            &mut platform,
            PositionSize::new(10, 20, 300, 200),
            ColorDepth::Rgb24,
        );
        assert_eq!(surface.position_size(), PositionSize::new(10, 20, 300, 200));
    }

    #[test]
    #[should_panic(expected = "failed to create native window")]
    fn creation_failure_is_fatal() {
        let mut platform = MockPlatform::new();
        platform.fail_create = true;
        let _ = NativeSurfaceHandle::create(
            &mut platform,
            PositionSize::new(0, 0, 100, 100),
            ColorDepth::Rgb24,
        );
    }

    #[test]
    fn adopted_handle_is_not_owned() {
        let mut platform = MockPlatform::new();
        let mut surface = NativeSurfaceHandle::adopt(
            NativeWindowHandle(0xbeef),
            PositionSize::new(0, 0, 64, 64),
            ColorDepth::Rgb24,
        );
        assert!(!surface.owns_handle());

        surface.teardown(&mut platform);
        assert!(
            platform.calls().is_empty(),
            "adopted handles are never destroyed"
        );
    }

    #[test]
    fn owned_handle_destroyed_exactly_once() {
        let mut platform = MockPlatform::new();
        let mut surface = NativeSurfaceHandle::create(
            &mut platform,
            PositionSize::new(0, 0, 100, 100),
            ColorDepth::Rgb24,
        );

        surface.teardown(&mut platform);
        surface.teardown(&mut platform);

        let destroys = platform
            .calls()
            .iter()
            .filter(|c| c.starts_with("destroy"))
            .count();
        assert_eq!(destroys, 1, "double teardown must not double-destroy");
    }

    #[test]
    fn hints_applied_at_creation() {
        let mut platform = MockPlatform::new();
        let _surface = NativeSurfaceHandle::create(
            &mut platform,
            PositionSize::new(0, 0, 100, 100),
            ColorDepth::Rgb24,
        );
        assert!(
            platform.calls().iter().any(|c| c.starts_with("set_hints")),
            "hints should be applied: {:?}",
            platform.calls()
        );
    }
}
