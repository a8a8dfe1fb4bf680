//! Application events for the tao event loop.

use global_hotkey::GlobalHotKeyEvent;
use tray_icon::menu::MenuEvent;

/// Events forwarded into the tao event loop from the hotkey and menu
/// handlers.
#[derive(Debug, Clone)]
pub enum AppEvent {
    /// A registered global hotkey was pressed or released
    HotKey(GlobalHotKeyEvent),
    /// A tray menu item was activated
    Menu(MenuEvent),
}
