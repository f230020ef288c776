//! Wire types for the backend REST surface
//!
//! Every response the client decodes has a concrete type here. Anything that
//! fails to decode surfaces as `ClientError::Decode` instead of leaking a
//! half-populated value into the UI.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Role carried by a verified access key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Facilitator,
    Participant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Facilitator => "facilitator",
            Role::Participant => "participant",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CircleStatus {
    #[default]
    Inactive,
    Active,
    Ended,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CircleType {
    #[default]
    Discussion,
    Translation,
    Study,
}

/// Circle summary attached to a verified key
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CircleSummary {
    pub id: i64,
    pub name: String,
    #[serde(rename = "jitsi_room_id", default)]
    pub room_id: Option<String>,
    #[serde(default)]
    pub circle_type: CircleType,
}

/// Full circle record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Circle {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub status: CircleStatus,
    #[serde(default)]
    pub circle_type: CircleType,
    pub created_at: DateTime<Utc>,
    #[serde(rename = "jitsi_room_id", default)]
    pub room_id: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CirclesResponse {
    pub circles: Vec<Circle>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct CreateCircleRequest {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub circle_type: Option<CircleType>,
}

/// Partial circle update; unset fields are left alone by the backend
#[derive(Debug, Clone, Default, Serialize)]
pub struct CircleUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<CircleStatus>,
}

/// Participant key minted for a circle
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ParticipantKey {
    #[serde(alias = "key_id")]
    pub id: i64,
    pub key: String,
    #[serde(default)]
    pub role: Option<Role>,
}

/// Generic acknowledgement for endpoints that only report success
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Acknowledgement {
    #[serde(default)]
    pub success: Option<bool>,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    pub database: String,
    #[serde(default)]
    pub error: Option<String>,
}

/// Answer of the key verification endpoint
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerifyKeyResponse {
    pub valid: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub circle: Option<CircleSummary>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl VerifyKeyResponse {
    pub fn invalid(error: impl Into<String>) -> Self {
        Self {
            valid: false,
            error: Some(error.into()),
            ..Default::default()
        }
    }
}

// Messages

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageType {
    #[default]
    Text,
    Html,
    System,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Message {
    pub id: i64,
    pub content: String,
    #[serde(default)]
    pub message_type: MessageType,
    pub sent_at: DateTime<Utc>,
    #[serde(default)]
    pub sender_role: Option<Role>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MessagesResponse {
    pub messages: Vec<Message>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CreateMessageRequest {
    pub circle_id: i64,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message_type: Option<MessageType>,
}

// Conference rooms

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoomStatus {
    Created,
    Active,
    Ended,
    Expired,
}

/// Backend record of the conference room owned by a circle
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ConferenceRoom {
    pub room_id: i64,
    pub room_name: String,
    pub room_password: String,
    pub status: RoomStatus,
    /// Join configuration computed by the backend for the caller's role
    #[serde(default)]
    pub config: serde_json::Value,
    #[serde(default)]
    pub participant_count: Option<u32>,
    #[serde(default)]
    pub max_participants: Option<u32>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct CreateRoomRequest {
    pub circle_id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enable_lobby: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enable_recording: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_participants: Option<u32>,
}

#[derive(Debug, Clone, Serialize)]
pub struct JoinRoomRequest {
    pub participant_id: String,
    pub display_name: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct LeaveRoomRequest {
    pub participant_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct JoinRoomResponse {
    pub success: bool,
    pub participant_id: String,
    pub role: String,
    pub room_status: RoomStatus,
    pub active_participants: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LeaveRoomResponse {
    pub success: bool,
    pub room_status: RoomStatus,
    pub active_participants: u32,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RoomStats {
    pub room_id: i64,
    pub room_name: String,
    pub status: RoomStatus,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub ended_at: Option<DateTime<Utc>>,
    pub total_participants: u32,
    pub active_participants: u32,
    #[serde(default)]
    pub max_concurrent: u32,
}

// Translation workflow

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentStatus {
    Uploaded,
    Loaded,
    InSession,
    Saved,
    Archived,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TranslationDocument {
    pub id: i64,
    pub circle: i64,
    #[serde(default)]
    pub circle_name: Option<String>,
    pub file_path: String,
    pub language: String,
    pub status: DocumentStatus,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub edition: String,
    #[serde(default)]
    pub json_version: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub last_loaded_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub last_saved_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TranslationSessionStatus {
    Active,
    Completed,
    Aborted,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TranslationSession {
    pub id: i64,
    pub document: i64,
    #[serde(default)]
    pub document_title: Option<String>,
    #[serde(default)]
    pub document_language: Option<String>,
    pub circle: i64,
    #[serde(default)]
    pub circle_name: Option<String>,
    pub status: TranslationSessionStatus,
    pub started_at: DateTime<Utc>,
    #[serde(default)]
    pub ended_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub total_paragraphs: u32,
    #[serde(default)]
    pub paragraphs_modified: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct StartSessionRequest {
    pub document_id: i64,
    pub circle_id: i64,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct EndSessionResponse {
    #[serde(default)]
    pub message: Option<String>,
    pub session: TranslationSession,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParagraphStatus {
    #[default]
    Unchecked,
    InProgress,
    Approved,
}

impl ParagraphStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ParagraphStatus::Unchecked => "unchecked",
            ParagraphStatus::InProgress => "in_progress",
            ParagraphStatus::Approved => "approved",
        }
    }
}

/// One paragraph under correction. Updates are last-write-wins.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ParagraphCorrection {
    pub id: i64,
    pub session: i64,
    pub paragraph_id: String,
    #[serde(default)]
    pub chapter_id: String,
    #[serde(default)]
    pub section_id: String,
    pub text: String,
    pub original_translation: String,
    pub corrected_translation: String,
    #[serde(default)]
    pub status: ParagraphStatus,
    #[serde(default)]
    pub last_modified_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub approved_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ParagraphList {
    pub session_id: i64,
    pub total_paragraphs: u32,
    pub paragraphs: Vec<ParagraphCorrection>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ParagraphUpdate {
    pub corrected_translation: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<ParagraphStatus>,
}

/// Query filters for paragraph listing
#[derive(Debug, Clone, Default)]
pub struct ParagraphFilter {
    pub status: Option<ParagraphStatus>,
    pub chapter: Option<String>,
}

impl ParagraphFilter {
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(status) = self.status {
            pairs.push(("status", status.as_str().to_string()));
        }
        if let Some(chapter) = &self.chapter {
            pairs.push(("chapter", chapter.clone()));
        }
        pairs
    }
}
