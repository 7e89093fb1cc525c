//! End-to-end AAR flow over the in-memory sheet store: submit a report,
//! extend its participants, and read statistics back through the cache.

use std::sync::Arc;

use battalion_bot::bootstrap::{BotRuntime, LEDGER_ALIAS, RuntimePorts};
use battalion_bot::config::BotSettings;
use battalion_bot::domain::ports::{CacheKey, SheetAddress, SheetReader};
use battalion_bot::domain::{AarFields, ErrorCode, EventType, SubmitAarRequest};
use battalion_bot::test_support::{
    InMemorySheetStore, MutableClock, RecordingNotifier, SequentialLogIds,
};
use chrono::{TimeZone, Utc};
use rstest::{fixture, rstest};

struct Flow {
    store: Arc<InMemorySheetStore>,
    notifier: Arc<RecordingNotifier>,
    runtime: BotRuntime,
}

fn row(cells: &[&str]) -> Vec<String> {
    cells.iter().map(|cell| (*cell).to_owned()).collect()
}

fn settings() -> BotSettings {
    BotSettings {
        sheets_api_base: None,
        sheets_access_token: None,
        aar_sheet_id: Some("aar-db".to_owned()),
        ledger_sheet_name: None,
        roster_sheet_id: Some("roster-db".to_owned()),
        registration_range: None,
        main_range: None,
        promotions_range: None,
        statistics_range: None,
        punishments_range: None,
        blacklist_range: None,
        cache_ttl_minutes: None,
        refresh_interval_minutes: None,
        http_timeout_secs: None,
        discord_webhook_url: None,
    }
}

#[fixture]
fn flow() -> Flow {
    let store = Arc::new(InMemorySheetStore::new());
    store.seed(
        "aar-db",
        "AARs",
        vec![row(&["Timestamp", "Name", "SteamID", "Event Type"])],
    );
    store.seed(
        "roster-db",
        "Registration",
        vec![
            row(&["Discord ID", "SteamID", "Name", "Rank", "Joined"]),
            row(&["1001", "STEAM_0:1:5555", "CT-5555 Fives", "CPL", "1/02/2024"]),
        ],
    );
    let notifier = Arc::new(RecordingNotifier::default());
    let ports = RuntimePorts {
        reader: Arc::clone(&store) as Arc<dyn SheetReader>,
        writer: Arc::clone(&store) as _,
        notifier: Arc::clone(&notifier) as _,
        log_ids: Arc::new(SequentialLogIds::default()),
        clock: Arc::new(MutableClock::new(
            Utc.with_ymd_and_hms(2024, 6, 2, 20, 15, 0)
                .single()
                .expect("valid time"),
        )),
    };
    let runtime = BotRuntime::assemble(&settings(), ports).expect("runtime assembles");
    Flow {
        store,
        notifier,
        runtime,
    }
}

fn joint_sim(participants: &str) -> SubmitAarRequest {
    SubmitAarRequest {
        event_type: EventType::JointTrainingSimulation,
        submitter_steam_id: "STEAM_0:1:5555".to_owned(),
        fallback_name: "fives".to_owned(),
        fields: AarFields::new()
            .with("host", "CT-5555 Fives")
            .with("battalions", "212th, 501st")
            .with("participants", participants)
            .with("summary", "Cleared the Citadel"),
    }
}

#[rstest]
#[tokio::test]
async fn submitted_reports_can_be_extended_and_counted(flow: Flow) {
    let submitted = flow
        .runtime
        .submissions
        .submit(joint_sim("Echo, Hardcase"))
        .await
        .expect("submitted");
    assert_eq!(submitted.row_index, 2);
    assert_eq!(flow.notifier.notices().len(), 1);

    let update = flow
        .runtime
        .submissions
        .append_participants(submitted.log_id.as_str(), &["Jesse".to_owned()])
        .await
        .expect("participants added");
    assert_eq!(update.participants, "Echo, Hardcase, Jesse");

    let rows = flow.store.rows("aar-db", "AARs");
    let written = rows.get(1).expect("ledger row");
    assert_eq!(written.get(32).map(String::as_str), Some("Echo, Hardcase, Jesse"));
    assert_eq!(written.get(109).map(String::as_str), Some("log-1"));

    let stats = flow
        .runtime
        .roster
        .aar_stats("STEAM_0:1:5555")
        .await
        .expect("stats");
    assert_eq!(stats.total, 1);
    assert_eq!(
        stats.by_event_type.get("Joint Training Simulation"),
        Some(&1)
    );
}

#[rstest]
#[tokio::test]
async fn ledger_reads_share_one_cache_entry_until_a_write(flow: Flow) {
    let ledger = CacheKey::new(LEDGER_ALIAS).expect("alias");
    let address = flow
        .runtime
        .cache
        .alias_address(&ledger)
        .expect("ledger alias bound");

    flow.runtime.roster.aar_stats("STEAM_0:1:5555").await.expect("stats");
    flow.runtime.roster.aar_stats("STEAM_0:1:5555").await.expect("stats");
    assert_eq!(flow.store.read_count(&address), 1);

    flow.runtime
        .submissions
        .submit(joint_sim("Echo"))
        .await
        .expect("submitted");
    let stats = flow
        .runtime
        .roster
        .aar_stats("STEAM_0:1:5555")
        .await
        .expect("stats");
    assert_eq!(stats.total, 1);
    assert_eq!(flow.store.read_count(&address), 2);
}

#[rstest]
#[tokio::test]
async fn refresh_sweep_reports_unreadable_ranges(flow: Flow) {
    let report = flow.runtime.cache.refresh_all().await;
    assert_eq!(report.failed, 0);
    assert_eq!(report.refreshed, flow.runtime.cache.stats().entry_count);

    flow.store.fail_reads(true);
    let report = flow.runtime.cache.refresh_all().await;
    assert_eq!(report.refreshed, 0);
    assert!(report.failed > 0);

    let registration = SheetAddress::new("roster-db", "Registration!A:E").expect("address");
    let served = flow
        .runtime
        .cache
        .get(&registration, None, false)
        .await
        .expect("stale rows are served");
    assert_eq!(served.len(), 2);
}

#[rstest]
#[tokio::test]
async fn unknown_log_ids_are_not_found(flow: Flow) {
    let error = flow
        .runtime
        .submissions
        .append_participants("missing", &["Jesse".to_owned()])
        .await
        .expect_err("no such report");
    assert_eq!(error.code(), ErrorCode::NotFound);
}
