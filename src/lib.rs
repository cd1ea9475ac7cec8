pub mod autostart;
pub mod dispatch;
pub mod gesture;
pub mod gui;
pub mod icon;
pub mod launcher;
pub mod logging;
pub mod settings;
pub mod shortcuts;
pub mod visibility;
pub mod win_util;
