use std::rc::Rc;

use anyhow::{Context, Result};
use arboard::Clipboard;
use global_hotkey::GlobalHotKeyEvent;
use hotlaunch::event::AppEvent;
use hotlaunch::icon::app_icon;
use hotlaunch::notify::NotificationLayer;
use hotlaunch::{
    ConfigManager, DEFAULT_LOG_LEVEL, GlobalHotKeyBackend, HotkeyRegistry, ProcessLauncher,
    VERSION, WindowHandle, XmlStore,
};
use parking_lot::Mutex;
use tao::event::{Event, StartCause};
use tao::event_loop::{ControlFlow, EventLoop, EventLoopBuilder};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tray_icon::TrayIconBuilder;
use tray_icon::menu::{AboutMetadataBuilder, Menu, MenuEvent, MenuItem, PredefinedMenuItem};

fn main() -> Result<()> {
    // Load config before logging so notifications can be switched off
    let config_manager = ConfigManager::new()?;
    let config = config_manager.load()?;
    // save back the config to create the file if it doesn't exist
    config_manager.save(&config)?;

    // Initialize the logger
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env("HOTLAUNCH_LOG")
                .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_LEVEL)),
        )
        .finish()
        .with(config.notifications.then(NotificationLayer::new))
        .init();

    if config.has_relative_store_path() {
        warn!(
            path = ?config.store_path,
            "store_path is relative and will be resolved against the working directory"
        );
    }

    // Open the hotkey store
    let store_path = config.resolved_store_path()?;
    let store = XmlStore::open(&store_path)
        .with_context(|| format!("Failed to open hotkey store at {:?}", store_path))?;

    // Set up the hotkey registry
    let backend =
        Rc::new(GlobalHotKeyBackend::new().context("Failed to create hotkey manager")?);
    let mut registry = HotkeyRegistry::new(
        backend.clone(),
        Box::new(store),
        Box::new(ProcessLauncher::new()),
        WindowHandle::THREAD,
    );
    registry.load_all().context("Failed to load hotkeys")?;

    // Create the tray menu
    let tray_menu = Menu::new();
    let item_quit = MenuItem::new("Quit", true, None);
    let item_copy_store = MenuItem::new("Copy store path", true, None);
    let item_reload = MenuItem::new("Reload hotkeys", true, None);
    tray_menu.append_items(&[
        // the name of the app
        &MenuItem::new(hotlaunch::APP_NAME_PRETTY, false, None),
        &PredefinedMenuItem::separator(),
        &PredefinedMenuItem::about(
            None,
            Some(
                AboutMetadataBuilder::new()
                    .version(Some(VERSION.to_owned()))
                    .build(),
            ),
        ),
        &item_copy_store,
        &item_reload,
        &PredefinedMenuItem::separator(),
        &item_quit,
    ])?;

    // Set up the event loop
    let mut icon_tray = None;

    let event_loop: EventLoop<AppEvent> = EventLoopBuilder::with_user_event().build();

    // Forward hotkey and menu events into the loop so it wakes up for them
    let hotkey_sender = Mutex::new(event_loop.create_proxy());
    GlobalHotKeyEvent::set_event_handler(Some(move |event| {
        hotkey_sender.lock().send_event(AppEvent::HotKey(event)).ok();
    }));
    let menu_sender = Mutex::new(event_loop.create_proxy());
    MenuEvent::set_event_handler(Some(move |event| {
        menu_sender.lock().send_event(AppEvent::Menu(event)).ok();
    }));

    event_loop.run(move |event, _, control_flow| {
        *control_flow = ControlFlow::Wait;

        match event {
            Event::NewEvents(StartCause::Init) => {
                // We create the icon once the event loop is actually running
                // to prevent issues like https://github.com/tauri-apps/tray-icon/issues/90
                if config.show_tray {
                    match app_icon().and_then(|icon| {
                        Ok(TrayIconBuilder::new()
                            .with_menu(Box::new(tray_menu.clone()))
                            .with_tooltip(tooltip(&registry))
                            .with_icon(icon)
                            .build()?)
                    }) {
                        Ok(tray) => {
                            icon_tray.replace(tray);
                        }
                        Err(e) => error!("Failed to create tray icon: {:#}", e),
                    }

                    // We have to request a redraw here to have the icon actually show up.
                    // Tao only exposes a redraw method on the Window so we use core-foundation directly.
                    #[cfg(target_os = "macos")]
                    unsafe {
                        use core_foundation::runloop::{CFRunLoopGetMain, CFRunLoopWakeUp};

                        let rl = CFRunLoopGetMain();
                        CFRunLoopWakeUp(rl);
                    }
                }

                info!(hotkeys = registry.len(), "HotLaunch ready");
            }
            Event::UserEvent(AppEvent::HotKey(event)) => {
                if let Some(binding_id) = backend.translate(&event) {
                    registry.handle_fired(binding_id);
                }
            }
            Event::UserEvent(AppEvent::Menu(event)) => {
                if event.id == item_quit.id() {
                    registry.dispose();
                    icon_tray.take();
                    *control_flow = ControlFlow::Exit;
                } else if event.id == item_copy_store.id() {
                    let copied = Clipboard::new().and_then(|mut clipboard| {
                        clipboard.set_text(store_path.to_string_lossy().into_owned())
                    });
                    if let Err(e) = copied {
                        error!("Failed to copy store path to clipboard: {}", e);
                    }
                } else if event.id == item_reload.id() {
                    match registry.load_all() {
                        Ok(()) => {
                            for entry in registry.entries() {
                                info!(
                                    entry_id = %entry.id(),
                                    chord = %entry.chord,
                                    status = ?registry.status(entry.id()),
                                    "hotkey"
                                );
                            }
                        }
                        Err(e) => error!("Failed to reload hotkeys: {}", e),
                    }
                    if let Some(tray) = &icon_tray {
                        tray.set_tooltip(Some(tooltip(&registry))).ok();
                    }
                }
            }
            Event::LoopDestroyed => registry.dispose(),
            _ => {}
        }
    });
}

fn tooltip(registry: &HotkeyRegistry) -> String {
    format!("{} - {} hotkeys", hotlaunch::APP_NAME, registry.len())
}
