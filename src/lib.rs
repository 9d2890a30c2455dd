// Window registry and the drag cache
mod state;

// Pointer-driven window dragging
#[path = "inputHandler/mod.rs"]
mod input_handler;

// Window list / window context providers
mod context;

// View models for the desktop, windows and the video library
mod view;

// Media store, player controls, random volume, attention gate
mod media;

// Environment configuration
mod config;

// Video hosting client
#[path = "videoHost/mod.rs"]
mod video_host;

// Startup data for the shell
mod loader;

use std::sync::{Arc, Mutex};
use std::time::Duration;

use config::{ConfigError, ShellConfig};
use context::{RenderScope, WindowsContext};
use input_handler::{DragEffect, ElementRef, ListenerHandle, ObserverHandle, Point};
use loader::LoaderError;
use media::player::{self, PlayerControls};
use media::{
    AttentionGate, LocalMediaStore, MediaIntent, MediaState, MediaStore, RandomVolume,
    RandomVolumeOptions,
};
use serde::Serialize;
use state::window::{WindowKind, WindowPayload};
use state::RegistryState;
use tauri::{AppHandle, Emitter, State};
use tauri_plugin_global_shortcut::{Code, GlobalShortcutExt, Shortcut, ShortcutState};
use tracing_subscriber::EnvFilter;
use video_host::MuxClient;
use view::desktop::{DesktopIcon, StartMenuView};
use view::videos::LibraryView;
use view::window::{WindowControl, WindowFrame, WindowProps, WindowView};
use view::Desktop;

// Event payload types for frontend communication
#[derive(Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct DragEffectPayload {
    window_id: String,
    effect: DragEffect,
}

// Media element mirror plus the helpers that drive it
struct PlayerState {
    store: Arc<Mutex<LocalMediaStore>>,
    random_volume: Mutex<Option<RandomVolume>>,
    attention: Mutex<AttentionGate>,
}

struct Host {
    config: ShellConfig,
    client: MuxClient,
}

// Missing credentials are reported when the shell loads, not at startup
struct HostState(Result<Host, ConfigError>);

impl HostState {
    fn from_env() -> Self {
        let host = ShellConfig::from_env().map(|config| {
            tracing::info!(?config, "configuration loaded");
            let client = MuxClient::new(&config);
            Host { config, client }
        });
        if let Err(e) = &host {
            tracing::error!("Configuration error: {}", e);
        }
        Self(host)
    }

    fn get(&self) -> Result<&Host, String> {
        self.0
            .as_ref()
            .map_err(|e| LoaderError::from(e.clone()).to_string())
    }
}

fn emit_windows_changed(app: &AppHandle, windows: &WindowsContext) -> Result<(), String> {
    app.emit("windows-changed", &*windows.snapshot())
        .map_err(|e| e.to_string())
}

fn emit_drag_effects(app: &AppHandle, window_id: &str, effects: Vec<DragEffect>) -> Result<(), String> {
    for effect in effects {
        app.emit(
            "drag-effect",
            DragEffectPayload {
                window_id: window_id.to_string(),
                effect,
            },
        )
        .map_err(|e| e.to_string())?;
    }
    Ok(())
}

/// Forward queued media requests to the webview's media element
fn flush_media_requests(app: &AppHandle, store: &Mutex<LocalMediaStore>) -> Result<MediaState, String> {
    let (requests, state) = {
        let mut store = store.lock().map_err(|e| e.to_string())?;
        (store.drain_requests(), store.state())
    };
    for intent in requests {
        app.emit("media-request", intent)
            .map_err(|e| e.to_string())?;
    }
    Ok(state)
}

fn dispatch_all(
    app: &AppHandle,
    store: &Mutex<LocalMediaStore>,
    intents: impl IntoIterator<Item = MediaIntent>,
) -> Result<MediaState, String> {
    {
        let mut store = store.lock().map_err(|e| e.to_string())?;
        for intent in intents {
            store.dispatch(intent);
        }
    }
    flush_media_requests(app, store)
}

fn mounted_view<'a>(desktop: &'a mut Desktop, id: &str) -> Result<&'a mut WindowView, String> {
    desktop
        .view_mut(id)
        .ok_or_else(|| format!("Window not mounted: {}", id))
}

// ===== Window Registry Commands =====

#[tauri::command]
fn open_window(
    id: String,
    context: Option<WindowPayload>,
    app: AppHandle,
    windows: State<WindowsContext>,
) -> Result<bool, String> {
    let changed = windows.open(&id, context.map(Arc::new));
    if changed {
        emit_windows_changed(&app, &windows)?;
    }
    Ok(changed)
}

#[tauri::command]
fn close_window(id: String, app: AppHandle, windows: State<WindowsContext>) -> Result<bool, String> {
    let changed = windows.close(&id);
    if changed {
        emit_windows_changed(&app, &windows)?;
    }
    Ok(changed)
}

#[tauri::command]
fn focus_window(id: String, app: AppHandle, windows: State<WindowsContext>) -> Result<bool, String> {
    let changed = windows.focus(&id);
    if changed {
        emit_windows_changed(&app, &windows)?;
    }
    Ok(changed)
}

#[tauri::command]
fn blur_windows(app: AppHandle, windows: State<WindowsContext>) -> Result<bool, String> {
    let changed = windows.blur();
    if changed {
        emit_windows_changed(&app, &windows)?;
    }
    Ok(changed)
}

#[tauri::command]
fn get_windows(windows: State<WindowsContext>) -> RegistryState {
    windows.snapshot().as_ref().clone()
}

// ===== Window View Commands =====

#[tauri::command]
fn mount_window(
    props: WindowProps,
    app: AppHandle,
    windows: State<WindowsContext>,
    desktop: State<Mutex<Desktop>>,
) -> Result<Option<WindowFrame>, String> {
    let mut desktop = desktop.lock().map_err(|e| e.to_string())?;
    let id = props.window_id.clone();

    let effects = desktop.mount(props, &windows);
    tracing::debug!(window = %id, mounted = desktop.mounted(), "window mounted");
    emit_drag_effects(&app, &id, effects)?;

    Ok(desktop.view(&id).and_then(|view| view.render(&windows)))
}

#[tauri::command]
fn unmount_window(id: String, app: AppHandle, desktop: State<Mutex<Desktop>>) -> Result<(), String> {
    let mut desktop = desktop.lock().map_err(|e| e.to_string())?;
    let effects = desktop.unmount(&id);
    emit_drag_effects(&app, &id, effects)
}

#[tauri::command]
fn render_window(
    id: String,
    windows: State<WindowsContext>,
    desktop: State<Mutex<Desktop>>,
) -> Result<Option<WindowFrame>, String> {
    let desktop = desktop.lock().map_err(|e| e.to_string())?;
    Ok(desktop.view(&id).and_then(|view| view.render(&windows)))
}

#[tauri::command]
fn title_pointer_down(
    id: String,
    pointer: Point,
    constraint: Option<ElementRef>,
    app: AppHandle,
    windows: State<WindowsContext>,
    desktop: State<Mutex<Desktop>>,
) -> Result<(), String> {
    let mut desktop = desktop.lock().map_err(|e| e.to_string())?;
    let before = windows.snapshot();

    let effects = mounted_view(&mut desktop, &id)?.title_pointer_down(&windows, pointer, constraint);
    emit_drag_effects(&app, &id, effects)?;

    if !Arc::ptr_eq(&before, &windows.snapshot()) {
        emit_windows_changed(&app, &windows)?;
    }
    Ok(())
}

/// Returns the new position when the window moved
#[tauri::command]
fn drag_pointer_move(
    id: String,
    handle: ListenerHandle,
    pointer: Point,
    desktop: State<Mutex<Desktop>>,
) -> Result<Option<Point>, String> {
    let mut desktop = desktop.lock().map_err(|e| e.to_string())?;
    let view = mounted_view(&mut desktop, &id)?;
    Ok(view
        .pointer_move(handle, pointer)
        .then(|| view.draggable().position()))
}

#[tauri::command]
fn drag_pointer_up(
    id: String,
    handle: ListenerHandle,
    app: AppHandle,
    windows: State<WindowsContext>,
    desktop: State<Mutex<Desktop>>,
) -> Result<(), String> {
    let mut desktop = desktop.lock().map_err(|e| e.to_string())?;
    let effects = desktop.end_drag(&windows, &id, handle, false);
    emit_drag_effects(&app, &id, effects)
}

#[tauri::command]
fn drag_pointer_cancel(
    id: String,
    handle: ListenerHandle,
    app: AppHandle,
    windows: State<WindowsContext>,
    desktop: State<Mutex<Desktop>>,
) -> Result<(), String> {
    let mut desktop = desktop.lock().map_err(|e| e.to_string())?;
    let effects = desktop.end_drag(&windows, &id, handle, true);
    emit_drag_effects(&app, &id, effects)
}

#[tauri::command]
fn drag_constraint_visibility(
    id: String,
    handle: ObserverHandle,
    visible: bool,
    desktop: State<Mutex<Desktop>>,
) -> Result<bool, String> {
    let mut desktop = desktop.lock().map_err(|e| e.to_string())?;
    Ok(mounted_view(&mut desktop, &id)?.constraint_visibility(handle, visible))
}

#[tauri::command]
fn press_window_control(
    id: String,
    control: WindowControl,
    app: AppHandle,
    windows: State<WindowsContext>,
    desktop: State<Mutex<Desktop>>,
) -> Result<bool, String> {
    let mut desktop = desktop.lock().map_err(|e| e.to_string())?;
    let changed = mounted_view(&mut desktop, &id)?.press_control(&windows, control);
    if changed {
        emit_windows_changed(&app, &windows)?;
    }
    Ok(changed)
}

#[tauri::command]
fn resize_window(id: String, width: f64, height: f64, desktop: State<Mutex<Desktop>>) -> Result<(), String> {
    let mut desktop = desktop.lock().map_err(|e| e.to_string())?;
    mounted_view(&mut desktop, &id)?.resize(width, height);
    Ok(())
}

// ===== Desktop Commands =====

#[tauri::command]
fn desktop_icons() -> Vec<DesktopIcon> {
    view::desktop::desktop_icons()
}

#[tauri::command]
fn activate_icon(kind: WindowKind, app: AppHandle, windows: State<WindowsContext>) -> Result<bool, String> {
    let scope = RenderScope::root().with_windows(windows.inner().clone());
    let changed = view::desktop::activate_icon(&scope, kind).map_err(|e| e.to_string())?;
    if changed {
        emit_windows_changed(&app, &windows)?;
    }
    Ok(changed)
}

#[tauri::command]
fn toggle_start_menu(desktop: State<Mutex<Desktop>>) -> Result<StartMenuView, String> {
    let mut desktop = desktop.lock().map_err(|e| e.to_string())?;
    desktop.start_menu.toggle();
    Ok(desktop.start_menu.render())
}

#[tauri::command]
fn close_start_menu(desktop: State<Mutex<Desktop>>) -> Result<StartMenuView, String> {
    let mut desktop = desktop.lock().map_err(|e| e.to_string())?;
    desktop.start_menu.close();
    Ok(desktop.start_menu.render())
}

// ===== Video Library Commands =====

#[tauri::command]
async fn load_shell(
    host: State<'_, HostState>,
    desktop: State<'_, Mutex<Desktop>>,
) -> Result<Option<LibraryView>, String> {
    let host = host.get()?;
    let result = loader::load_shell(host.config.cors_origin.as_deref(), &host.client).await;

    let mut desktop = desktop.lock().map_err(|e| e.to_string())?;
    match result {
        Ok(data) => {
            desktop.library.load(data);
            Ok(desktop.library.render())
        }
        Err(e) => {
            if let LoaderError::Host(host_error) = &e {
                desktop.library.fail(host_error);
            }
            Err(e.to_string())
        }
    }
}

/// Refetch the asset list, e.g. after an upload succeeded
#[tauri::command]
async fn refresh_videos(
    host: State<'_, HostState>,
    desktop: State<'_, Mutex<Desktop>>,
) -> Result<Option<LibraryView>, String> {
    let host = host.get()?;
    let result = view::videos::fetch_videos(&host.client).await;

    let mut desktop = desktop.lock().map_err(|e| e.to_string())?;
    desktop.library.apply_fetch(result);
    Ok(desktop.library.render())
}

#[tauri::command]
fn render_library(desktop: State<Mutex<Desktop>>) -> Result<Option<LibraryView>, String> {
    let desktop = desktop.lock().map_err(|e| e.to_string())?;
    Ok(desktop.library.render())
}

#[tauri::command]
fn select_video(
    video_id: String,
    app: AppHandle,
    windows: State<WindowsContext>,
    desktop: State<Mutex<Desktop>>,
) -> Result<bool, String> {
    let desktop = desktop.lock().map_err(|e| e.to_string())?;
    let scope = RenderScope::root().with_windows(windows.inner().clone());
    let changed = desktop
        .library
        .select(&scope, &video_id)
        .map_err(|e| e.to_string())?;
    if changed {
        emit_windows_changed(&app, &windows)?;
    }
    Ok(changed)
}

// ===== Media Commands =====

#[tauri::command]
fn media_dispatch(intent: MediaIntent, app: AppHandle, playback: State<PlayerState>) -> Result<MediaState, String> {
    dispatch_all(&app, &playback.store, [intent])
}

/// State reported by the media element after it changed
#[tauri::command]
fn media_sync(media: MediaState, playback: State<PlayerState>) -> Result<(), String> {
    let mut store = playback.store.lock().map_err(|e| e.to_string())?;
    store.sync(media);
    Ok(())
}

#[tauri::command]
fn media_controls(playback: State<PlayerState>) -> Result<PlayerControls, String> {
    let store = playback.store.lock().map_err(|e| e.to_string())?;
    Ok(player::controls(&store.state()))
}

#[tauri::command]
fn media_volume_input(volume: f64, app: AppHandle, playback: State<PlayerState>) -> Result<MediaState, String> {
    let state = playback.store.lock().map_err(|e| e.to_string())?.state();
    dispatch_all(&app, &playback.store, player::on_volume_input(&state, volume))
}

#[tauri::command]
fn media_playback_speed_input(
    rate: f64,
    app: AppHandle,
    playback: State<PlayerState>,
) -> Result<MediaState, String> {
    dispatch_all(&app, &playback.store, player::on_playback_speed_input(rate))
}

/// Source for the player rendered inside window `window_id`
#[tauri::command]
fn player_source(
    window_id: String,
    windows: State<WindowsContext>,
    desktop: State<Mutex<Desktop>>,
) -> Result<Option<String>, String> {
    let desktop = desktop.lock().map_err(|e| e.to_string())?;
    let window = windows
        .window_scope(&window_id)
        .ok_or_else(|| format!("Window not found: {}", window_id))?;
    let scope = RenderScope::root()
        .with_windows(windows.inner().clone())
        .with_window(window);
    player::source_url(&scope, desktop.library.videos()).map_err(|e| e.to_string())
}

// Async so the timer task is spawned on the runtime
#[tauri::command]
async fn start_random_volume(
    interval_ms: Option<u64>,
    initial_volume: Option<f64>,
    unmute: Option<bool>,
    app: AppHandle,
    playback: State<'_, PlayerState>,
) -> Result<(), String> {
    if interval_ms == Some(0) {
        return Err("Random volume interval must be positive".to_string());
    }
    let defaults = RandomVolumeOptions::default();
    let options = RandomVolumeOptions {
        interval: interval_ms
            .map(Duration::from_millis)
            .unwrap_or(defaults.interval),
        initial_volume: initial_volume.unwrap_or(defaults.initial_volume),
        unmute: unmute.unwrap_or(defaults.unmute),
    };

    let mut slot = playback.random_volume.lock().map_err(|e| e.to_string())?;
    // Stop the running timer before its replacement sets the initial volume
    drop(slot.take());

    let store = Arc::clone(&playback.store);
    *slot = Some(RandomVolume::start(
        Arc::clone(&playback.store),
        options,
        move |_| {
            if let Err(e) = flush_media_requests(&app, &store) {
                tracing::warn!("Failed to forward random volume: {}", e);
            }
        },
    ));
    Ok(())
}

/// Returns whether a timer was running
#[tauri::command]
fn stop_random_volume(playback: State<PlayerState>) -> Result<bool, String> {
    let mut slot = playback.random_volume.lock().map_err(|e| e.to_string())?;
    Ok(slot.take().is_some_and(|timer| timer.is_running()))
}

#[tauri::command]
fn set_slider_pointer_down(down: bool, playback: State<PlayerState>) -> Result<(), String> {
    let slot = playback.random_volume.lock().map_err(|e| e.to_string())?;
    if let Some(timer) = slot.as_ref() {
        timer.set_slider_pointer_down(down);
    }
    Ok(())
}

/// Presence report from the face detector
#[tauri::command]
fn report_attention(
    attentive: bool,
    app: AppHandle,
    playback: State<PlayerState>,
) -> Result<Option<MediaIntent>, String> {
    let intent = {
        let mut gate = playback.attention.lock().map_err(|e| e.to_string())?;
        let state = playback.store.lock().map_err(|e| e.to_string())?.state();
        gate.observe(attentive, &state)
    };
    dispatch_all(&app, &playback.store, intent)?;
    Ok(intent)
}

#[tauri::command]
fn set_attention_gate_enabled(enabled: bool, app: AppHandle, playback: State<PlayerState>) -> Result<(), String> {
    let intent = {
        let mut gate = playback.attention.lock().map_err(|e| e.to_string())?;
        let intent = gate.set_enabled(enabled);
        tracing::info!(enabled = gate.is_enabled(), "attention gate");
        intent
    };
    dispatch_all(&app, &playback.store, intent).map(|_| ())
}

// ===== Global Shortcuts =====

/// Default shortcuts we want registered while the shell has focus
fn default_shortcuts() -> Vec<Shortcut> {
    vec![Shortcut::new(None, Code::MediaPlayPause)]
}

fn toggle_playback(app: &AppHandle, store: &Mutex<LocalMediaStore>) -> Result<MediaState, String> {
    let state = store.lock().map_err(|e| e.to_string())?.state();
    dispatch_all(app, store, [player::play_button(&state).intent])
}

/// Enable or disable global shortcuts (used to release bindings when window unfocused)
#[tauri::command]
fn set_global_shortcuts_enabled(app: AppHandle, enabled: bool) -> Result<(), String> {
    if enabled {
        // First unregister all shortcuts to avoid "already registered" errors
        let _ = app.global_shortcut().unregister_all();

        let mut success_count = 0;
        let mut last_error = None;

        for shortcut in default_shortcuts() {
            match app.global_shortcut().register(shortcut.clone()) {
                Ok(_) => success_count += 1,
                Err(e) => {
                    tracing::warn!("Failed to register shortcut {:?}: {}", shortcut, e);
                    last_error = Some(e);
                }
            }
        }

        if success_count > 0 {
            tracing::info!("Global shortcuts enabled ({} keys registered)", success_count);
            Ok(())
        } else if let Some(e) = last_error {
            Err(format!("Failed to register any shortcuts: {}", e))
        } else {
            Err("Failed to register shortcuts for unknown reason".to_string())
        }
    } else {
        tracing::info!("Global shortcuts disabled");
        app.global_shortcut()
            .unregister_all()
            .map_err(|e| format!("Failed to unregister shortcuts: {}", e))
    }
}

#[cfg_attr(mobile, tauri::mobile_entry_point)]
pub fn run() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_ansi(false)
        .init();

    let store = Arc::new(Mutex::new(LocalMediaStore::new()));
    let player_state = PlayerState {
        store: Arc::clone(&store),
        random_volume: Mutex::new(None),
        attention: Mutex::new(AttentionGate::new()),
    };

    let play_pause = Shortcut::new(None, Code::MediaPlayPause);

    tauri::Builder::default()
        .plugin(tauri_plugin_opener::init())
        .plugin(
            tauri_plugin_global_shortcut::Builder::new()
                .with_handler(move |app, shortcut, event| {
                    // Only process on key press, not release
                    if event.state != ShortcutState::Pressed {
                        return;
                    }
                    if shortcut == &play_pause {
                        if let Err(e) = toggle_playback(app, &store) {
                            tracing::warn!("Play/pause shortcut failed: {}", e);
                        }
                    }
                })
                .build(),
        )
        .manage(WindowsContext::default())
        .manage(Mutex::new(Desktop::new()))
        .manage(player_state)
        .manage(HostState::from_env())
        .setup(|_app| {
            // Shortcuts register when the webview reports focus, through
            // set_global_shortcuts_enabled()
            tracing::info!("desktop shell initialized");
            Ok(())
        })
        .invoke_handler(tauri::generate_handler![
            // Window registry
            open_window,
            close_window,
            focus_window,
            blur_windows,
            get_windows,
            // Window views and dragging
            mount_window,
            unmount_window,
            render_window,
            title_pointer_down,
            drag_pointer_move,
            drag_pointer_up,
            drag_pointer_cancel,
            drag_constraint_visibility,
            press_window_control,
            resize_window,
            // Desktop
            desktop_icons,
            activate_icon,
            toggle_start_menu,
            close_start_menu,
            // Video library
            load_shell,
            refresh_videos,
            render_library,
            select_video,
            // Media
            media_dispatch,
            media_sync,
            media_controls,
            media_volume_input,
            media_playback_speed_input,
            player_source,
            start_random_volume,
            stop_random_volume,
            set_slider_pointer_down,
            report_attention,
            set_attention_gate_enabled,
            set_global_shortcuts_enabled,
        ])
        .run(tauri::generate_context!())
        .expect("error while running tauri application");
}
