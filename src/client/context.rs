use uuid::Uuid;

use crate::client::api::ApiClient;
use crate::client::conference::{ConferenceAdapter, ConferenceConfig, ConferenceHost};
use crate::client::router::{Navigation, RouteTable};
use crate::client::session::SessionStore;
use crate::client::storage::SessionStorage;
use crate::client::top_bar::TopBar;
use crate::shared::config::AppConfig;
use crate::shared::error::{ClientError, ConferenceError, FlowError};
use crate::shared::models::{JoinRoomRequest, JoinRoomResponse, LeaveRoomRequest, LeaveRoomResponse};

/// Application context: the API client, session store, route table,
/// conferencing adapter and top bar, constructed once by the entry point and
/// passed to whatever needs them.
pub struct AppContext<H: ConferenceHost> {
    pub config: AppConfig,
    pub session: SessionStore,
    pub routes: RouteTable,
    pub conference: ConferenceAdapter<H>,
    pub top_bar: TopBar,
    participant_id: String,
    active_room: Option<i64>,
}

impl<H: ConferenceHost> AppContext<H> {
    pub fn new(
        config: AppConfig,
        storage: Box<dyn SessionStorage>,
        host: H,
    ) -> Result<Self, ClientError> {
        let api = ApiClient::new(&config)?;
        let conference = ConferenceAdapter::new(
            host,
            config.conference_domain.clone(),
            config.conference_tenant.clone(),
        );

        Ok(Self {
            session: SessionStore::new(api, storage),
            routes: RouteTable::default_routes(),
            conference,
            top_bar: TopBar::new(),
            participant_id: Uuid::new_v4().to_string(),
            active_room: None,
            config,
        })
    }

    pub fn with_routes(mut self, routes: RouteTable) -> Self {
        self.routes = routes;
        self
    }

    pub fn api(&self) -> &ApiClient {
        self.session.api()
    }

    /// Identifier this client reports when joining and leaving rooms
    pub fn participant_id(&self) -> &str {
        &self.participant_id
    }

    pub fn active_room(&self) -> Option<i64> {
        self.active_room
    }

    /// Run the navigation guard for `path`
    pub fn navigate(&mut self, path: &str) -> Navigation {
        let navigation = self.routes.guard(path, &mut self.session);
        self.sync_top_bar();
        navigation
    }

    pub async fn login(&mut self, key: &str) -> bool {
        let ok = self.session.login(key).await;
        self.sync_top_bar();
        ok
    }

    pub fn restore_session(&mut self) -> bool {
        let ok = self.session.restore_session();
        self.sync_top_bar();
        ok
    }

    pub fn logout(&mut self) {
        self.conference.dispose();
        self.active_room = None;
        self.session.logout();
        self.top_bar.clear_circle_name();
    }

    fn sync_top_bar(&mut self) {
        match self.session.circle() {
            Some(circle) => self.top_bar.set_circle_name(circle.name.clone()),
            None => self.top_bar.clear_circle_name(),
        }
    }

    /// Embed the session circle's conference into `container_id` and
    /// register this client as a room participant.
    pub async fn join_circle_conference(
        &mut self,
        container_id: &str,
    ) -> Result<JoinRoomResponse, FlowError> {
        if !self.session.is_authenticated() {
            return Err(ClientError::NotAuthenticated.into());
        }
        let circle = self
            .session
            .circle()
            .cloned()
            .ok_or(ConferenceError::NoRoom)?;

        let room = self.api().get_room_for_circle(circle.id).await?;

        let config = ConferenceConfig {
            room_name: room.room_name.clone(),
            display_name: self.top_bar.user_name().to_string(),
            subject: Some(circle.name.clone()),
            password: Some(room.room_password.clone()),
            moderator: self.session.is_facilitator(),
            ..Default::default()
        };
        self.conference
            .initialize_conference(&config, container_id)
            .await?;

        let join = JoinRoomRequest {
            participant_id: self.participant_id.clone(),
            display_name: self.top_bar.user_name().to_string(),
        };
        let response = match self.api().join_room(room.room_id, &join).await {
            Ok(response) => response,
            Err(e) => {
                self.conference.dispose();
                return Err(e.into());
            }
        };

        self.active_room = Some(room.room_id);
        tracing::info!(
            room_id = room.room_id,
            active = response.active_participants,
            "Joined circle conference"
        );
        Ok(response)
    }

    /// Hang up, dispose the widget and report leaving the room.
    pub async fn leave_circle_conference(&mut self) -> Result<LeaveRoomResponse, FlowError> {
        let room_id = self.active_room.ok_or(ConferenceError::NoActiveConference)?;

        self.conference.hangup();
        self.conference.dispose();
        self.active_room = None;

        let leave = LeaveRoomRequest {
            participant_id: self.participant_id.clone(),
        };
        Ok(self.api().leave_room(room_id, &leave).await?)
    }
}
