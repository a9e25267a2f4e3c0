// Copyright 2026 the Terrane Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Render-surface and EGL lifecycle management for terrane.
//!
//! This crate owns the render-thread side of the toolkit: native window
//! handles, the EGL surface/context lifecycle, and the per-frame
//! pre/post-render contract. Platform specifics are injected through two
//! traits, keeping the state machines testable with doubles:
//!
//! - **[`NativeWindowing`](native::NativeWindowing)** — the windowing calls a
//!   platform backend provides (create/destroy/move/resize/show, title and
//!   hint properties, the deiconify-approval client message, and a display
//!   round-trip). Backend crates implement this against the real display
//!   server; the setup and event-loop wiring differ fundamentally across
//!   platforms and stay out of this crate.
//!
//! - **[`EglApi`](egl::EglApi)** / **[`GlAbstraction`](egl::GlAbstraction)**
//!   — the EGL and GL entry points consumed by
//!   [`EglContextManager`](egl::EglContextManager).
//!
//! # Surface lifecycle
//!
//! ```text
//! Uninitialized ──initialize_egl──► EglInitialized ──create_egl_surface──► SurfaceCreated
//!                                                                              │  ▲
//!                                             pre_render / post_render / ──────┘  │
//!                                             replace_egl_surface (self-loops)    │
//!                                                                                 │
//!                               SurfaceDestroyed ◄──destroy_egl_surface───────────┘
//! ```
//!
//! Failure policy: a native window that cannot be created is fatal (there is
//! no degraded mode for a GUI without a drawable); EGL surface *replacement*
//! failure is recoverable and reported by `bool`; calling a GL-affecting
//! operation without a live surface is a contract violation and asserts.

pub mod egl;
pub mod native;
pub mod surface;
pub mod time;

pub use egl::{EglApi, EglContextManager, EglError, EglSurfaceHandle, GlAbstraction};
pub use native::{
    ColorDepth, NativeDisplayHandle, NativeError, NativeSurfaceHandle, NativeWindowHandle,
    NativeWindowing, PositionSize, WindowHints,
};
pub use surface::{
    MoveResizeOutcome, PixmapRenderSurface, RenderSurface, SurfaceState, SurfaceType,
    WindowRenderSurface,
};
pub use time::{now, timebase};
