pub mod backend;
pub mod detector;
pub mod tap;

pub use backend::{DefaultHookBackend, MockHookBackend, MockHookHandle};
pub use detector::{ClickState, GestureDetector, GestureEvent, DOUBLE_CLICK_THRESHOLD};
pub use tap::{HookBackend, MouseButton, PointerEvent, PointerInput, PointerTap, TapHandler};
