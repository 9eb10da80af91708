//! Dispatcher and volunteer sessions sharing one store and one channel hub.

use std::sync::{Arc, Mutex};

use pretty_assertions::assert_eq;
use psra_config::{DispatchConfig, RelayConfig};
use psra_core::entities::{Incident, NewIncident, NewVolunteer};
use psra_core::enums::{IncidentStatus, SupportStatus};
use psra_core::errors::CoreError;
use psra_dispatch::{DispatchError, DispatchService};
use psra_relay::{BroadcastHub, Notification, NotificationRelay, NotificationType, SenderId};
use psra_store::{CollectionStore, KeyValueStore, MemoryStore};

struct Session {
    service: DispatchService,
    relay: Arc<NotificationRelay>,
}

fn session(store: &MemoryStore, hub: &BroadcastHub, name: &str) -> Session {
    let backend: Arc<dyn KeyValueStore> = Arc::new(store.attach());
    let relay = Arc::new(
        NotificationRelay::connect(
            &RelayConfig::default(),
            SenderId::from(format!("sender_{name}")),
            Some(hub),
            Some(Arc::clone(&backend)),
        )
        .unwrap(),
    );
    let service = DispatchService::new(CollectionStore::new(backend), DispatchConfig::default())
        .with_relay(Arc::clone(&relay));
    Session { service, relay }
}

fn record(relay: &NotificationRelay, kind: NotificationType) -> Arc<Mutex<Vec<Notification>>> {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    let _subscription = relay.listen(kind, move |n| sink.lock().unwrap().push(n.clone()));
    seen
}

fn report() -> NewIncident {
    NewIncident {
        reporter_name: "Um Abdullah".into(),
        reporter_phone: "0500000002".into(),
        maps_url: "https://maps.google.com/?q=24.774265,46.738586".into(),
        incident_type: "lost hiker".into(),
        incident_image: None,
    }
}

fn volunteer(name: &str) -> NewVolunteer {
    NewVolunteer {
        full_name: name.into(),
        national_id: "2345678901".into(),
        phone: "0552222222".into(),
        birth_date: "1992-05-10".into(),
        blood_type: "A-".into(),
        region: "Riyadh".into(),
    }
}

fn assert_consistent(service: &DispatchService) {
    for incident in service.list_incidents().unwrap() {
        assert!(incident.assignment_consistent(), "inconsistent: {incident:?}");
    }
}

#[test]
fn approve_accept_and_double_accept() {
    let store = MemoryStore::new();
    let hub = BroadcastHub::new(32);
    let dispatcher = session(&store, &hub, "dispatcher");
    let volunteer_tab = session(&store, &hub, "volunteer");
    let approvals = record(&volunteer_tab.relay, NotificationType::NewApprovedIncident);
    let updates = record(&volunteer_tab.relay, NotificationType::IncidentsUpdated);

    let incident = dispatcher.service.create_incident(&report()).unwrap();
    let approved = dispatcher
        .service
        .approve_incident(&incident.id, "supervisor")
        .unwrap();
    assert_eq!(approved.status, IncidentStatus::Approved);
    assert_eq!(approved.approved_by.as_deref(), Some("supervisor"));

    volunteer_tab.relay.drain();
    let approvals = approvals.lock().unwrap().clone();
    assert_eq!(approvals.len(), 1);
    match &approvals[0] {
        Notification::NewApprovedIncident(summary) => assert_eq!(summary.id, incident.id),
        other => panic!("unexpected notification {other:?}"),
    }
    // create + approve
    assert_eq!(updates.lock().unwrap().len(), 2);

    let accepted = volunteer_tab
        .service
        .accept_incident(&incident.id, "vol_7")
        .unwrap();
    assert_eq!(accepted.status, IncidentStatus::InProgress);
    assert_eq!(accepted.assigned_volunteer_id.as_deref(), Some("vol_7"));

    let err = volunteer_tab
        .service
        .accept_incident(&incident.id, "vol_9")
        .unwrap_err();
    assert!(matches!(err, DispatchError::Core(CoreError::AlreadyAssigned { .. })));
    let unchanged: Incident = dispatcher.service.get_incident(&incident.id).unwrap();
    assert_eq!(unchanged, accepted);
    assert_consistent(&dispatcher.service);
}

#[test]
fn close_requires_note_and_credits_points() {
    let store = MemoryStore::new();
    let hub = BroadcastHub::new(32);
    let dispatcher = session(&store, &hub, "dispatcher");
    let volunteer_tab = session(&store, &hub, "volunteer");

    let vol = dispatcher.service.register_volunteer(&volunteer("Noura")).unwrap();
    let incident = dispatcher.service.create_incident(&report()).unwrap();
    dispatcher.service.approve_incident(&incident.id, "supervisor").unwrap();
    volunteer_tab.service.accept_incident(&incident.id, &vol.id).unwrap();
    let before = volunteer_tab.service.volunteer_points(&vol.id).unwrap();

    let err = volunteer_tab
        .service
        .close_incident(&incident.id, &vol.id, "")
        .unwrap_err();
    assert!(matches!(err, DispatchError::Core(CoreError::Validation(_))));
    assert_eq!(
        volunteer_tab.service.get_incident(&incident.id).unwrap().status,
        IncidentStatus::InProgress
    );

    let closed = volunteer_tab
        .service
        .close_incident(&incident.id, &vol.id, "resolved")
        .unwrap();
    assert_eq!(closed.status, IncidentStatus::Closed);
    assert_eq!(closed.close_note.as_deref(), Some("resolved"));
    assert_eq!(
        dispatcher.service.volunteer_points(&vol.id).unwrap(),
        before + 15
    );
    assert_consistent(&dispatcher.service);
}

#[test]
fn approved_support_reaches_the_volunteer_once() {
    let store = MemoryStore::new();
    let hub = BroadcastHub::new(32);
    let dispatcher = session(&store, &hub, "dispatcher");
    let volunteer_tab = session(&store, &hub, "volunteer");
    let requests = record(&dispatcher.relay, NotificationType::NewSupportRequest);
    let approvals = record(&volunteer_tab.relay, NotificationType::SupportApproved);

    let incident = dispatcher.service.create_incident(&report()).unwrap();
    dispatcher.service.approve_incident(&incident.id, "supervisor").unwrap();
    volunteer_tab.service.accept_incident(&incident.id, "vol_7").unwrap();
    let request = volunteer_tab
        .service
        .request_support(&incident.id, "vol_7", Some("need a second car"))
        .unwrap();
    assert_eq!(request.status, SupportStatus::Pending);

    dispatcher.relay.drain();
    assert_eq!(requests.lock().unwrap().len(), 1);

    let approved = dispatcher.service.approve_support(&request.id).unwrap();
    assert_eq!(approved.status, SupportStatus::Approved);
    assert!(approved.approved_at.is_some());

    volunteer_tab.relay.drain();
    let approvals = approvals.lock().unwrap().clone();
    assert_eq!(approvals.len(), 1);
    assert_eq!(approvals[0].addressed_to(), Some("vol_7"));
    assert_eq!(
        volunteer_tab
            .service
            .support_status_for(&incident.id, "vol_7")
            .unwrap(),
        Some(SupportStatus::Approved)
    );
}

#[test]
fn deleting_an_incident_cascades_to_its_support_requests() {
    let store = MemoryStore::new();
    let hub = BroadcastHub::new(32);
    let dispatcher = session(&store, &hub, "dispatcher");

    let doomed = dispatcher.service.create_incident(&report()).unwrap();
    let kept = dispatcher.service.create_incident(&report()).unwrap();
    dispatcher.service.request_support(&doomed.id, "vol_7", None).unwrap();
    dispatcher.service.request_support(&doomed.id, "vol_8", None).unwrap();
    let survivor = dispatcher.service.request_support(&kept.id, "vol_7", None).unwrap();

    dispatcher.service.delete_incident(&doomed.id).unwrap();

    assert_eq!(dispatcher.service.list_support_requests().unwrap(), vec![survivor]);
    assert_eq!(dispatcher.service.list_incidents().unwrap().len(), 1);
}

#[test]
fn deleting_support_tells_the_requester() {
    let store = MemoryStore::new();
    let hub = BroadcastHub::new(32);
    let dispatcher = session(&store, &hub, "dispatcher");
    let volunteer_tab = session(&store, &hub, "volunteer");
    let deletions = record(&volunteer_tab.relay, NotificationType::SupportDeleted);

    let incident = dispatcher.service.create_incident(&report()).unwrap();
    let request = volunteer_tab
        .service
        .request_support(&incident.id, "vol_3", None)
        .unwrap();
    dispatcher.service.delete_support(&request.id).unwrap();

    volunteer_tab.relay.drain();
    let deletions = deletions.lock().unwrap().clone();
    assert_eq!(deletions, vec![Notification::support_deleted("vol_3")]);
}

#[test]
fn a_closed_relay_does_not_fail_mutations() {
    let store = MemoryStore::new();
    let hub = BroadcastHub::new(32);
    let dispatcher = session(&store, &hub, "dispatcher");
    dispatcher.relay.close();

    let incident = dispatcher.service.create_incident(&report()).unwrap();
    assert!(dispatcher.service.approve_incident(&incident.id, "supervisor").is_ok());
}
