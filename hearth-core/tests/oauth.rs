use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use hearth_core::api::{ApiError, ErrorClass};
use hearth_core::config::OAuthSection;
use hearth_core::oauth::{
    BrowserLauncher, CloudFile, ConnectionOutcome, ConnectionStatus, ConnectorBackend, ConnectorService,
    OAuthCallback, OAuthError, OAuthFlow, OAuthResult,
};
use serde_json::Value;

struct FakeBackend {
    auth_url: String,
    connected_after: u32,
    polls: AtomicU32,
    expired: Vec<ConnectorService>,
    listings: Mutex<Vec<(ConnectorService, Option<String>)>>,
}

impl FakeBackend {
    fn new(connected_after: u32) -> Self {
        Self {
            auth_url: "https://login.example.com/authorize?client_id=hearth".into(),
            connected_after,
            polls: AtomicU32::new(0),
            expired: Vec::new(),
            listings: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl ConnectorBackend for FakeBackend {
    async fn initiate(&self, _service: ConnectorService) -> OAuthResult<String> {
        Ok(self.auth_url.clone())
    }

    async fn connection_status(&self, service: ConnectorService) -> OAuthResult<ConnectionStatus> {
        if self.expired.contains(&service) {
            return Err(OAuthError::Api(ApiError::Status {
                status: 400,
                message: "Token expired, please reconnect".into(),
                data: Value::Null,
            }));
        }
        let polls = self.polls.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(ConnectionStatus {
            connected: polls >= self.connected_after,
            email: Some("pat@example.com".into()),
            ..ConnectionStatus::default()
        })
    }

    async fn list_files(
        &self,
        service: ConnectorService,
        folder_id: Option<&str>,
    ) -> OAuthResult<Vec<CloudFile>> {
        self.listings.lock().unwrap().push((service, folder_id.map(str::to_string)));
        let file = |id: &str, name: &str, is_folder: bool| CloudFile {
            id: id.into(),
            name: name.into(),
            is_folder,
            ..CloudFile::default()
        };
        Ok(match folder_id {
            None => vec![file("f-1", "Taxes", true), file("d-1", "Lease.pdf", false)],
            Some("f-1") => vec![file("d-2", "2024 return.pdf", false)],
            Some(_) => Vec::new(),
        })
    }
}

#[derive(Default)]
struct RecordingLauncher {
    opened: Mutex<Vec<String>>,
}

#[async_trait]
impl BrowserLauncher for RecordingLauncher {
    async fn open(&self, url: &str) -> OAuthResult<()> {
        self.opened.lock().unwrap().push(url.to_string());
        Ok(())
    }
}

fn section(attempts: u32) -> OAuthSection {
    OAuthSection {
        redirect_scheme: "myapp".into(),
        poll_interval_seconds: 3,
        poll_attempts: attempts,
    }
}

#[tokio::test(start_paused = true)]
async fn connect_polls_until_connected() {
    let backend = Arc::new(FakeBackend::new(3));
    let launcher = Arc::new(RecordingLauncher::default());
    let flow = OAuthFlow::new(backend.clone(), launcher.clone(), &section(5));

    let started = tokio::time::Instant::now();
    let outcome = flow.connect(ConnectorService::OneDrive).await.unwrap();
    match outcome {
        ConnectionOutcome::Connected(status) => {
            assert_eq!(status.email.as_deref(), Some("pat@example.com"))
        }
        other => panic!("unexpected outcome {other:?}"),
    }
    assert_eq!(backend.polls.load(Ordering::SeqCst), 3);
    assert_eq!(started.elapsed(), Duration::from_secs(9));
    assert_eq!(
        launcher.opened.lock().unwrap().as_slice(),
        ["https://login.example.com/authorize?client_id=hearth"]
    );
}

#[tokio::test(start_paused = true)]
async fn connect_gives_up_after_attempt_budget() {
    let backend = Arc::new(FakeBackend::new(u32::MAX));
    let flow = OAuthFlow::new(backend.clone(), Arc::new(RecordingLauncher::default()), &section(4));
    let outcome = flow.connect(ConnectorService::Outlook).await.unwrap();
    assert_eq!(outcome, ConnectionOutcome::Pending { attempts: 4 });
    assert_eq!(backend.polls.load(Ordering::SeqCst), 4);
}

#[tokio::test(start_paused = true)]
async fn invalid_auth_url_stops_before_browser() {
    let backend = Arc::new(FakeBackend {
        auth_url: "not a url".into(),
        ..FakeBackend::new(1)
    });
    let launcher = Arc::new(RecordingLauncher::default());
    let flow = OAuthFlow::new(backend, launcher.clone(), &section(3));
    let err = flow.connect(ConnectorService::GoogleDrive).await.unwrap_err();
    assert!(matches!(err, OAuthError::InvalidAuthUrl { .. }));
    assert!(launcher.opened.lock().unwrap().is_empty());
}

#[tokio::test(start_paused = true)]
async fn reconnect_errors_are_classified() {
    let backend = Arc::new(FakeBackend {
        expired: vec![ConnectorService::GooglePhotos],
        ..FakeBackend::new(1)
    });
    let flow = OAuthFlow::new(backend, Arc::new(RecordingLauncher::default()), &section(3));
    let err = flow.connect(ConnectorService::GooglePhotos).await.unwrap_err();
    assert!(err.needs_reconnect());
    match err {
        OAuthError::Api(api) => assert_eq!(api.class(), ErrorClass::Reconnect),
        other => panic!("unexpected error {other:?}"),
    }
}

#[tokio::test]
async fn statuses_are_collected_for_every_service() {
    let backend = Arc::new(FakeBackend {
        expired: vec![ConnectorService::Outlook],
        ..FakeBackend::new(1)
    });
    let flow = OAuthFlow::new(backend, Arc::new(RecordingLauncher::default()), &section(1));
    let statuses = flow.statuses(&ConnectorService::ALL).await;

    assert_eq!(statuses.len(), 4);
    assert_eq!(statuses[0].0, ConnectorService::Outlook);
    assert!(statuses[0].1.is_err());
    assert!(statuses[1..]
        .iter()
        .all(|(_, status)| status.as_ref().map(|s| s.connected).unwrap_or(false)));
}

#[tokio::test]
async fn callback_completion() {
    let flow = OAuthFlow::new(
        Arc::new(FakeBackend::new(1)),
        Arc::new(RecordingLauncher::default()),
        &section(1),
    );
    let ok = OAuthCallback::parse("myapp://oauth/callback?success=true&service=onedrive", "myapp").unwrap();
    assert!(matches!(
        flow.complete(&ok).await.unwrap(),
        ConnectionOutcome::Connected(_)
    ));

    let denied = OAuthCallback::parse(
        "myapp://oauth/callback?success=false&message=User+cancelled&service=outlook",
        "myapp",
    )
    .unwrap();
    match flow.complete(&denied).await.unwrap_err() {
        OAuthError::Denied { service, message } => {
            assert_eq!(service, ConnectorService::Outlook);
            assert_eq!(message, "User cancelled");
        }
        other => panic!("unexpected error {other:?}"),
    }
}

#[test]
fn deep_link_round_trips() {
    let callback = OAuthCallback {
        success: false,
        message: Some("Access denied: token expired & revoked".into()),
        service: Some("googledrive".into()),
    };
    let link = callback.render("myapp");
    assert!(link.starts_with("myapp://oauth/callback?success=false&message="));
    assert!(link.ends_with("&service=googledrive"));
    assert_eq!(OAuthCallback::parse(&link, "myapp").unwrap(), callback);

    let link = "myapp://oauth/callback?success=true&message=Connected&service=outlook";
    let parsed = OAuthCallback::parse(link, "myapp").unwrap();
    assert_eq!(parsed.render("myapp"), link);
}

#[tokio::test]
async fn drive_folders_are_listed() {
    let backend = Arc::new(FakeBackend::new(1));
    let flow = OAuthFlow::new(backend.clone(), Arc::new(RecordingLauncher::default()), &section(1));

    let root = flow.files(ConnectorService::OneDrive, None).await.unwrap();
    assert_eq!(root.len(), 2);
    assert!(root[0].is_folder);
    let nested = flow
        .files(ConnectorService::GoogleDrive, Some(root[0].id.as_str()))
        .await
        .unwrap();
    assert_eq!(nested[0].name, "2024 return.pdf");
    assert_eq!(
        backend.listings.lock().unwrap().as_slice(),
        [
            (ConnectorService::OneDrive, None),
            (ConnectorService::GoogleDrive, Some("f-1".to_string())),
        ]
    );
}

#[tokio::test]
async fn photo_and_mail_services_have_no_files() {
    let backend = Arc::new(FakeBackend::new(1));
    let flow = OAuthFlow::new(backend.clone(), Arc::new(RecordingLauncher::default()), &section(1));

    for service in [ConnectorService::GooglePhotos, ConnectorService::Outlook] {
        let err = flow.files(service, None).await.unwrap_err();
        assert!(matches!(err, OAuthError::Unsupported { .. }));
    }
    assert!(backend.listings.lock().unwrap().is_empty());
}
