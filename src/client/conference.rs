//! Conferencing adapter
//!
//! Embeds one third-party conferencing widget per page. The adapter loads the
//! widget script at most once per domain, builds the widget options from a
//! `ConferenceConfig`, forwards event subscriptions and commands, and owns
//! disposal.
//!
//! The embedding surface is abstracted behind `ConferenceHost` and `Widget`
//! so the adapter's lifecycle can run anywhere a host can be provided.

use std::sync::{Arc, LazyLock, Mutex};

use async_trait::async_trait;
use rand::Rng;
use regex::Regex;
use serde::Serialize;
use serde_json::{json, Value};
use strum::{AsRefStr, EnumIter};

use crate::shared::error::ConferenceError;

/// Listener attached to a widget event
pub type EventHandler = Box<dyn FnMut(&Value) + Send>;

/// The page the widget is embedded into.
#[async_trait]
pub trait ConferenceHost: Send {
    /// Fetch and evaluate the widget script
    async fn load_script(&mut self, url: &str) -> Result<(), String>;

    fn container_exists(&self, container_id: &str) -> bool;

    /// Construct a widget; fails with `ConstructorMissing` when the script
    /// did not expose one
    fn create_widget(
        &mut self,
        domain: &str,
        container_id: &str,
        options: &WidgetOptions,
    ) -> Result<Box<dyn Widget>, ConferenceError>;
}

/// A live widget instance.
pub trait Widget: Send {
    fn add_event_listener(&mut self, event: &str, handler: EventHandler);
    fn execute_command(&mut self, command: &str, args: Vec<Value>);
    fn dispose(&mut self);
}

/// Host for contexts with no embedding surface, such as a terminal.
/// Scripts are never fetched and no widget can be built.
#[derive(Debug, Default, Clone, Copy)]
pub struct DetachedHost;

#[async_trait]
impl ConferenceHost for DetachedHost {
    async fn load_script(&mut self, _url: &str) -> Result<(), String> {
        Err("no embedding surface available".to_string())
    }

    fn container_exists(&self, _container_id: &str) -> bool {
        false
    }

    fn create_widget(
        &mut self,
        _domain: &str,
        _container_id: &str,
        _options: &WidgetOptions,
    ) -> Result<Box<dyn Widget>, ConferenceError> {
        Err(ConferenceError::ConstructorMissing)
    }
}

/// Widget events the adapter exposes
#[derive(Debug, Clone, Copy, PartialEq, Eq, AsRefStr, EnumIter)]
#[strum(serialize_all = "camelCase")]
pub enum ConferenceEvent {
    ParticipantJoined,
    ParticipantLeft,
    VideoConferenceJoined,
    VideoConferenceLeft,
    ReadyToClose,
    DominantSpeakerChanged,
    ParticipantRoleChanged,
    PasswordRequired,
}

/// Commands dispatched to the widget
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConferenceCommand {
    Hangup,
    ToggleAudio,
    ToggleVideo,
    SetPassword(String),
    LockRoom,
    UnlockRoom,
    MuteParticipant(String),
    MuteEveryone,
    KickParticipant(String),
    GrantModerator(String),
    StartRecording,
    StopRecording,
}

impl ConferenceCommand {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Hangup => "hangup",
            Self::ToggleAudio => "toggleAudio",
            Self::ToggleVideo => "toggleVideo",
            Self::SetPassword(_) => "password",
            Self::LockRoom | Self::UnlockRoom => "lockRoom",
            Self::MuteParticipant(_) => "muteParticipant",
            Self::MuteEveryone => "muteEveryone",
            Self::KickParticipant(_) => "kickParticipant",
            Self::GrantModerator(_) => "grantModerator",
            Self::StartRecording => "startRecording",
            Self::StopRecording => "stopRecording",
        }
    }

    pub fn args(&self) -> Vec<Value> {
        match self {
            Self::SetPassword(value)
            | Self::MuteParticipant(value)
            | Self::KickParticipant(value)
            | Self::GrantModerator(value) => vec![Value::String(value.clone())],
            Self::LockRoom => vec![Value::Bool(true)],
            Self::UnlockRoom => vec![Value::Bool(false)],
            Self::StartRecording => vec![json!({ "mode": "file" })],
            Self::StopRecording => vec![Value::String("file".to_string())],
            _ => Vec::new(),
        }
    }
}

/// Per-embed conference settings
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConferenceConfig {
    pub room_name: String,
    pub display_name: String,
    pub email: Option<String>,
    pub avatar_url: Option<String>,
    pub subject: Option<String>,
    pub password: Option<String>,
    pub moderator: bool,
    pub jwt: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WidgetUserInfo {
    pub display_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

/// Options handed to the widget constructor
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WidgetOptions {
    pub room_name: String,
    pub width: String,
    pub height: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub jwt: Option<String>,
    pub config_overwrite: Value,
    pub interface_config_overwrite: Value,
    pub user_info: WidgetUserInfo,
}

const BASE_TOOLBAR: [&str; 8] = [
    "microphone",
    "camera",
    "desktop",
    "fullscreen",
    "hangup",
    "chat",
    "raisehand",
    "tileview",
];

const MODERATOR_TOOLBAR: [&str; 2] = ["mute-everyone", "invite"];

impl WidgetOptions {
    /// Build widget options. Under a tenant the room name is namespaced as
    /// `tenant/room`.
    pub fn from_config(config: &ConferenceConfig, tenant: Option<&str>) -> Self {
        let room_name = match tenant {
            Some(tenant) => format!("{}/{}", tenant, config.room_name),
            None => config.room_name.clone(),
        };

        let mut overrides = json!({
            "prejoinPageEnabled": false,
            "prejoinConfig": { "enabled": false },
            "lobby": { "enabled": false },
            "startWithAudioMuted": true,
            "startWithVideoMuted": false,
            "enableWelcomePage": false,
            "enableClosePage": false,
            "disableInviteFunctions": true,
            "enableLobbyChat": false,
            "enableInsecureRoomNameWarning": false,
            "enableUserRolesBasedOnToken": config.jwt.is_some(),
            "disableModeratorIndicator": false,
            "requireDisplayName": false,
            "enableNoisyMicDetection": false,
            "disablePolls": true,
            "hideConferenceSubject": false,
        });
        if let Value::Object(map) = &mut overrides {
            if let Some(password) = &config.password {
                map.insert("roomPassword".to_string(), Value::String(password.clone()));
            }
            if let Some(subject) = &config.subject {
                map.insert("subject".to_string(), Value::String(subject.clone()));
            }
        }

        let mut toolbar: Vec<&str> = BASE_TOOLBAR.to_vec();
        if config.moderator {
            toolbar.extend(MODERATOR_TOOLBAR);
        }

        Self {
            room_name,
            width: "100%".to_string(),
            height: "500px".to_string(),
            jwt: config.jwt.clone(),
            config_overwrite: overrides,
            interface_config_overwrite: json!({
                "TOOLBAR_BUTTONS": toolbar,
                "SHOW_JITSI_WATERMARK": false,
                "SHOW_WATERMARK_FOR_GUESTS": false,
                "SHOW_BRAND_WATERMARK": false,
                "BRAND_WATERMARK_LINK": "",
                "DEFAULT_BACKGROUND": "#1e3a8a",
                "DISABLE_VIDEO_BACKGROUND": false,
                "SHOW_PROMOTIONAL_CLOSE_PAGE": false,
                "SHOW_CHROME_EXTENSION_BANNER": false,
            }),
            user_info: WidgetUserInfo {
                display_name: config.display_name.clone(),
                email: config.email.clone(),
            },
        }
    }
}

/// Owner of the single embedded widget.
pub struct ConferenceAdapter<H: ConferenceHost> {
    host: H,
    domain: String,
    tenant: Option<String>,
    loaded_script: Option<String>,
    widget: Option<Box<dyn Widget>>,
    current_room: Arc<Mutex<Option<String>>>,
}

impl<H: ConferenceHost> ConferenceAdapter<H> {
    pub fn new(host: H, domain: impl Into<String>, tenant: Option<String>) -> Self {
        Self {
            host,
            domain: domain.into(),
            tenant,
            loaded_script: None,
            widget: None,
            current_room: Arc::new(Mutex::new(None)),
        }
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn domain(&self) -> &str {
        &self.domain
    }

    /// Point the adapter at another domain; the script is fetched again on
    /// the next initialize.
    pub fn set_domain(&mut self, domain: impl Into<String>) {
        self.domain = domain.into();
        self.loaded_script = None;
    }

    pub fn set_tenant(&mut self, tenant: Option<String>) {
        self.tenant = tenant;
        self.loaded_script = None;
    }

    pub fn script_url(&self) -> String {
        match &self.tenant {
            Some(tenant) => format!("https://{}/{}/external_api.js", self.domain, tenant),
            None => format!("https://{}/external_api.js", self.domain),
        }
    }

    pub fn is_script_loaded(&self) -> bool {
        self.loaded_script.as_deref() == Some(self.script_url().as_str())
    }

    pub async fn ensure_script_loaded(&mut self) -> Result<(), ConferenceError> {
        if self.is_script_loaded() {
            return Ok(());
        }

        let url = self.script_url();
        tracing::debug!("Loading conferencing script from {}", url);
        self.host
            .load_script(&url)
            .await
            .map_err(|reason| ConferenceError::ScriptLoad {
                url: url.clone(),
                reason,
            })?;
        self.loaded_script = Some(url);
        Ok(())
    }

    /// Embed a conference into `container_id`.
    ///
    /// Only one widget is ever tracked: an existing one is disposed before
    /// the new one is built.
    pub async fn initialize_conference(
        &mut self,
        config: &ConferenceConfig,
        container_id: &str,
    ) -> Result<(), ConferenceError> {
        self.ensure_script_loaded().await?;

        if !self.host.container_exists(container_id) {
            return Err(ConferenceError::ContainerNotFound(container_id.to_string()));
        }

        if self.widget.is_some() {
            tracing::warn!("Conference already initialized, disposing previous widget");
            self.dispose();
        }

        let options = WidgetOptions::from_config(config, self.tenant.as_deref());
        let widget = match self.host.create_widget(&self.domain, container_id, &options) {
            Ok(widget) => widget,
            Err(e) => {
                tracing::error!("Failed to initialize conference: {}", e);
                return Err(e);
            }
        };

        self.widget = Some(widget);
        *self.current_room.lock().unwrap_or_else(|e| e.into_inner()) =
            Some(config.room_name.clone());
        self.install_basic_handlers();
        tracing::info!("Conference initialized for room {}", config.room_name);
        Ok(())
    }

    fn install_basic_handlers(&mut self) {
        let room = Arc::clone(&self.current_room);
        self.on(
            ConferenceEvent::ReadyToClose,
            Box::new(move |_| {
                tracing::info!("Conference ready to close");
                *room.lock().unwrap_or_else(|e| e.into_inner()) = None;
            }),
        );
        self.on(
            ConferenceEvent::ParticipantRoleChanged,
            Box::new(|event| tracing::info!("Participant role changed: {}", event)),
        );
        self.on(
            ConferenceEvent::PasswordRequired,
            Box::new(|_| tracing::info!("Password required for room")),
        );
    }

    /// Register a listener; ignored when no conference is active
    pub fn on(&mut self, event: ConferenceEvent, handler: EventHandler) {
        if let Some(widget) = self.widget.as_mut() {
            widget.add_event_listener(event.as_ref(), handler);
        }
    }

    pub fn on_ready_to_close(&mut self, mut callback: impl FnMut() + Send + 'static) {
        self.on(ConferenceEvent::ReadyToClose, Box::new(move |_| callback()));
    }

    pub fn on_participant_joined(&mut self, callback: impl FnMut(&Value) + Send + 'static) {
        self.on(ConferenceEvent::ParticipantJoined, Box::new(callback));
    }

    pub fn on_participant_left(&mut self, callback: impl FnMut(&Value) + Send + 'static) {
        self.on(ConferenceEvent::ParticipantLeft, Box::new(callback));
    }

    pub fn on_conference_joined(&mut self, callback: impl FnMut(&Value) + Send + 'static) {
        self.on(ConferenceEvent::VideoConferenceJoined, Box::new(callback));
    }

    pub fn on_conference_left(&mut self, mut callback: impl FnMut() + Send + 'static) {
        self.on(ConferenceEvent::VideoConferenceLeft, Box::new(move |_| callback()));
    }

    /// The callback receives the new dominant speaker's participant id
    pub fn on_dominant_speaker_changed(&mut self, mut callback: impl FnMut(&str) + Send + 'static) {
        self.on(
            ConferenceEvent::DominantSpeakerChanged,
            Box::new(move |event| {
                if let Some(id) = event.get("id").and_then(Value::as_str) {
                    callback(id);
                }
            }),
        );
    }

    /// Forward a raw command; ignored when no conference is active
    pub fn execute_command(&mut self, command: &str, args: Vec<Value>) {
        if let Some(widget) = self.widget.as_mut() {
            widget.execute_command(command, args);
        }
    }

    pub fn command(&mut self, command: ConferenceCommand) {
        self.execute_command(command.name(), command.args());
    }

    pub fn hangup(&mut self) {
        self.command(ConferenceCommand::Hangup);
    }

    pub fn toggle_audio(&mut self) {
        self.command(ConferenceCommand::ToggleAudio);
    }

    pub fn toggle_video(&mut self) {
        self.command(ConferenceCommand::ToggleVideo);
    }

    pub fn set_password(&mut self, password: impl Into<String>) {
        self.command(ConferenceCommand::SetPassword(password.into()));
    }

    pub fn lock_room(&mut self) {
        self.command(ConferenceCommand::LockRoom);
    }

    pub fn unlock_room(&mut self) {
        self.command(ConferenceCommand::UnlockRoom);
    }

    pub fn mute_participant(&mut self, participant_id: impl Into<String>) {
        self.command(ConferenceCommand::MuteParticipant(participant_id.into()));
    }

    pub fn mute_everyone(&mut self) {
        self.command(ConferenceCommand::MuteEveryone);
    }

    pub fn kick_participant(&mut self, participant_id: impl Into<String>) {
        self.command(ConferenceCommand::KickParticipant(participant_id.into()));
    }

    /// Admit a participant from the waiting room by granting moderator
    pub fn grant_moderator(&mut self, participant_id: impl Into<String>) {
        self.command(ConferenceCommand::GrantModerator(participant_id.into()));
    }

    pub fn start_recording(&mut self) {
        self.command(ConferenceCommand::StartRecording);
    }

    pub fn stop_recording(&mut self) {
        self.command(ConferenceCommand::StopRecording);
    }

    pub fn current_room(&self) -> Option<String> {
        self.current_room
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    pub fn has_widget(&self) -> bool {
        self.widget.is_some()
    }

    pub fn is_conference_active(&self) -> bool {
        self.widget.is_some() && self.current_room().is_some()
    }

    /// Tear down the widget and forget the room. Safe to call repeatedly.
    pub fn dispose(&mut self) {
        if let Some(mut widget) = self.widget.take() {
            widget.dispose();
            tracing::debug!("Conference widget disposed");
        }
        *self.current_room.lock().unwrap_or_else(|e| e.into_inner()) = None;
    }
}

static ROOM_NAME_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^ic-[a-zA-Z0-9\-_]+$").expect("room name pattern is valid")
});

const BASE36: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

fn random_base36(len: usize) -> String {
    let mut rng = rand::thread_rng();
    (0..len)
        .map(|_| BASE36[rng.gen_range(0..BASE36.len())] as char)
        .collect()
}

/// Room name of the form `ic-{circle}-{random}-{suffix}`.
///
/// The suffix is the first eight characters of the session id, or the
/// current millisecond timestamp. Not cryptographically random.
pub fn generate_room_name(circle_id: &str, session_id: Option<&str>) -> String {
    let base = format!("ic-{}-{}", circle_id, random_base36(6));
    match session_id {
        Some(session_id) => {
            let prefix: String = session_id.chars().take(8).collect();
            format!("{}-{}", base, prefix)
        }
        None => format!("{}-{}", base, chrono::Utc::now().timestamp_millis()),
    }
}

/// Eight uppercase base-36 characters. Not cryptographically random.
pub fn generate_room_password() -> String {
    random_base36(8).to_uppercase()
}

pub fn is_valid_room_name(room_name: &str) -> bool {
    ROOM_NAME_PATTERN.is_match(room_name)
}
