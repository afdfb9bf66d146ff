use async_trait::async_trait;
use futures::executor::block_on;
use org_authz::{
    Engine, EngineBuilder, LegacyRole, OrganizationId, ROLE_ADMIN, ROLE_MEMBER, ROLE_MODERATOR,
    ROLE_USER, RoleAssignment, RoleId, RoleName, RoleRecord, RoleStore, StoreError, Subject, User,
    UserId, Vote, Voter,
};
use std::io;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tracing_subscriber::fmt::MakeWriter;

#[derive(Default, Clone)]
struct FixtureStore {
    records: Vec<RoleRecord>,
}

#[async_trait]
impl RoleStore for FixtureStore {
    async fn load_all(&self) -> Result<Vec<RoleRecord>, StoreError> {
        Ok(self.records.clone())
    }
}

fn id(value: &str) -> RoleId {
    RoleId::try_from(value).unwrap()
}

fn role(role_id: &str, name: &str) -> RoleRecord {
    RoleRecord::new(id(role_id), RoleName::try_from(name).unwrap())
}

fn org(value: &str) -> OrganizationId {
    OrganizationId::try_from(value).unwrap()
}

fn chain_store() -> FixtureStore {
    FixtureStore {
        records: vec![
            role("r_user", ROLE_USER),
            role("r_mod", ROLE_MODERATOR).with_parent(id("r_user")),
            role("r_admin", ROLE_ADMIN).with_parent(id("r_mod")),
            role("r_billing", "ROLE_BILLING"),
        ],
    }
}

fn engine(store: FixtureStore) -> Engine<FixtureStore> {
    EngineBuilder::new(store).default_voters().build()
}

fn user(user_id: &str) -> User {
    User::new(UserId::try_from(user_id).unwrap())
}

/// Buffer-backed writer so tests can assert on emitted warnings.
#[derive(Clone, Default)]
struct CaptureWriter {
    buffer: Arc<Mutex<Vec<u8>>>,
}

impl CaptureWriter {
    fn contents(&self) -> String {
        let buffer = self.buffer.lock().expect("poisoned lock");
        String::from_utf8_lossy(&buffer).into_owned()
    }
}

impl io::Write for CaptureWriter {
    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        let mut buffer = self.buffer.lock().expect("poisoned lock");
        buffer.extend_from_slice(data);
        Ok(data.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for CaptureWriter {
    type Writer = CaptureWriter;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

fn capture_logs(level: tracing::Level, run: impl FnOnce()) -> String {
    let writer = CaptureWriter::default();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(writer.clone())
        .with_max_level(level)
        .with_ansi(false)
        .finish();
    tracing::subscriber::with_default(subscriber, run);
    writer.contents()
}

fn capture_warnings(run: impl FnOnce()) -> String {
    capture_logs(tracing::Level::WARN, run)
}

#[test]
fn inheritance_is_upward_monotonic() {
    let engine = engine(chain_store());
    let admin = user("user_1").with_assignment(RoleAssignment::platform(role("r_admin", ROLE_ADMIN)));

    assert!(block_on(engine.has_role(Some(&admin), ROLE_MODERATOR, None)).unwrap());
    assert!(block_on(engine.has_role(Some(&admin), ROLE_USER, None)).unwrap());
    assert!(!block_on(engine.has_role(Some(&admin), "ROLE_BILLING", None)).unwrap());
}

#[test]
fn inheritance_never_flows_downward() {
    let engine = engine(chain_store());
    let base = user("user_1").with_assignment(RoleAssignment::platform(role("r_user", ROLE_USER)));

    assert!(!block_on(engine.has_role(Some(&base), ROLE_MODERATOR, None)).unwrap());
    assert!(!block_on(engine.has_role(Some(&base), ROLE_ADMIN, None)).unwrap());
}

#[test]
fn self_cycle_terminates_warns_and_keeps_self() {
    let store = FixtureStore {
        records: vec![role("r_loop", "ROLE_LOOP").with_parent(id("r_loop"))],
    };
    let engine = engine(store);
    let holder =
        user("user_1").with_assignment(RoleAssignment::platform(role("r_loop", "ROLE_LOOP")));

    let logs = capture_warnings(|| {
        assert!(block_on(engine.has_role(Some(&holder), "ROLE_LOOP", None)).unwrap());
    });

    assert!(logs.contains("cycle detected"), "missing warning in: {logs}");
}

#[test]
fn indirect_cycle_terminates_and_warns() {
    let store = FixtureStore {
        records: vec![
            role("r_a", "ROLE_A").with_parent(id("r_b")),
            role("r_b", "ROLE_B").with_parent(id("r_a")),
        ],
    };
    let engine = engine(store);
    let holder = user("user_1").with_assignment(RoleAssignment::platform(role("r_a", "ROLE_A")));

    let logs = capture_warnings(|| {
        assert!(block_on(engine.has_role(Some(&holder), "ROLE_A", None)).unwrap());
        assert!(block_on(engine.has_role(Some(&holder), "ROLE_B", None)).unwrap());
    });

    assert!(logs.contains("cycle detected"), "missing warning in: {logs}");
}

#[test]
fn deep_chain_warns_depth_exceeded_and_still_answers() {
    let records: Vec<RoleRecord> = (0..15)
        .map(|i| {
            let record = role(&format!("r_{i}"), &format!("ROLE_{i}"));
            if i + 1 < 15 {
                record.with_parent(id(&format!("r_{}", i + 1)))
            } else {
                record
            }
        })
        .collect();
    let engine = engine(FixtureStore { records });
    let holder = user("user_1").with_assignment(RoleAssignment::platform(role("r_0", "ROLE_0")));

    let logs = capture_warnings(|| {
        assert!(block_on(engine.has_role(Some(&holder), "ROLE_0", None)).unwrap());
        // Beyond the depth bound the answer is a defined deny.
        assert!(!block_on(engine.has_role(Some(&holder), "ROLE_14", None)).unwrap());
    });

    assert!(logs.contains("depth exceeded"), "missing warning in: {logs}");
}

#[test]
fn cache_accounting_one_miss_then_hits() {
    let engine = engine(chain_store());
    let admin = user("user_1").with_assignment(RoleAssignment::platform(role("r_admin", ROLE_ADMIN)));

    engine.clear_role_hierarchy_cache();
    engine.reset_cache_metrics();
    for _ in 0..5 {
        block_on(engine.has_role(Some(&admin), ROLE_ADMIN, None)).unwrap();
    }

    let metrics = engine.cache_metrics();
    assert_eq!(metrics.misses, 1);
    assert_eq!(metrics.hits, 4);
    assert!((metrics.hit_rate - 0.8).abs() < f64::EPSILON);
}

#[test]
fn reset_metrics_preserves_cache_state() {
    let engine = engine(chain_store());
    let admin = user("user_1").with_assignment(RoleAssignment::platform(role("r_admin", ROLE_ADMIN)));

    block_on(engine.has_role(Some(&admin), ROLE_ADMIN, None)).unwrap();
    let warmed = engine.cache_metrics();
    engine.reset_cache_metrics();

    let metrics = engine.cache_metrics();
    assert_eq!(metrics.hits, 0);
    assert_eq!(metrics.misses, 0);
    assert_eq!(metrics.size, warmed.size);
    assert_eq!(metrics.last_warm_time_ms, warmed.last_warm_time_ms);
}

#[test]
fn self_access_is_asymmetric_even_for_admin() {
    let engine = engine(chain_store());
    let admin = user("user_1").with_assignment(RoleAssignment::platform(role("r_admin", ROLE_ADMIN)));
    let own = Subject::user(admin.id.clone());

    assert!(block_on(engine.is_granted(Some(&admin), "user.view", Some(&own))).unwrap());
    assert!(block_on(engine.is_granted(Some(&admin), "user.edit", Some(&own))).unwrap());
    assert!(!block_on(engine.is_granted(Some(&admin), "user.delete", Some(&own))).unwrap());
    assert!(!block_on(engine.is_granted(Some(&admin), "user.roles.manage", Some(&own))).unwrap());
}

#[test]
fn organization_membership_is_scoped_to_the_exact_org() {
    let engine = engine(chain_store());
    let org_a = org("org_a");
    let member = user("user_1")
        .with_assignment(RoleAssignment::scoped(org_a.clone(), role("r_m", ROLE_MEMBER)));

    let subject_a = Subject::organization(org_a);
    let subject_b = Subject::organization_with_slug(org("org_b"), "other-org");

    assert!(block_on(engine.is_granted(Some(&member), "organization.view", Some(&subject_a))).unwrap());
    assert!(!block_on(engine.is_granted(Some(&member), "organization.view", Some(&subject_b))).unwrap());
}

#[test]
fn non_member_deny_diagnostic_carries_organization_fields() {
    let engine = engine(chain_store());
    let member = user("user_1")
        .with_assignment(RoleAssignment::scoped(org("org_a"), role("r_m", ROLE_MEMBER)));
    let subject_b = Subject::organization_with_slug(org("org_b"), "other-org");

    let logs = capture_logs(tracing::Level::DEBUG, || {
        let granted =
            block_on(engine.is_granted(Some(&member), "organization.view", Some(&subject_b)))
                .unwrap();
        assert!(!granted);
    });

    assert!(logs.contains("no membership"), "missing diagnostic in: {logs}");
    assert!(logs.contains("org_b"));
    assert!(logs.contains("other-org"));
}

#[test]
fn missing_subject_denies_voter_backed_attributes() {
    let engine = engine(chain_store());
    let admin = user("user_1").with_assignment(RoleAssignment::platform(role("r_admin", ROLE_ADMIN)));

    assert!(!block_on(engine.is_granted(Some(&admin), "user.delete", None)).unwrap());
    assert!(!block_on(engine.is_granted(Some(&admin), "organization.view", None)).unwrap());
}

#[test]
fn legacy_role_reduces_to_highest_rank() {
    let engine = engine(chain_store());

    let moderator = user("user_1")
        .with_assignment(RoleAssignment::platform(role("r_user", ROLE_USER)))
        .with_assignment(RoleAssignment::platform(role("r_mod", ROLE_MODERATOR)));
    assert_eq!(engine.legacy_role(Some(&moderator)), LegacyRole::Moderator);

    let admin = moderator
        .clone()
        .with_assignment(RoleAssignment::scoped(org("org_a"), role("r_admin", ROLE_ADMIN)));
    assert_eq!(engine.legacy_role(Some(&admin)), LegacyRole::Admin);
    assert_eq!(engine.legacy_role(Some(&admin)).as_str(), "ADMIN");

    let unrecognized =
        user("user_2").with_assignment(RoleAssignment::platform(role("r_x", "ROLE_WIZARD")));
    assert_eq!(engine.legacy_role(Some(&unrecognized)), LegacyRole::User);

    assert_eq!(engine.legacy_role(None), LegacyRole::User);
}

struct SpyVoter {
    supports_calls: Arc<AtomicUsize>,
}

impl Voter for SpyVoter {
    fn supports(&self, attribute: &str, _subject: Option<&Subject>) -> bool {
        self.supports_calls.fetch_add(1, Ordering::SeqCst);
        attribute == "report.view"
    }

    fn vote(&self, _user: &User, _attribute: &str, _subject: Option<&Subject>) -> Vote {
        Vote::Grant
    }
}

#[test]
fn voter_routing_is_memoized_per_attribute_and_subject_presence() {
    let calls = Arc::new(AtomicUsize::new(0));
    let engine = EngineBuilder::new(chain_store())
        .voter(SpyVoter {
            supports_calls: Arc::clone(&calls),
        })
        .build();
    let actor = user("user_1");

    let first = block_on(engine.is_granted(Some(&actor), "report.view", None)).unwrap();
    let second = block_on(engine.is_granted(Some(&actor), "report.view", None)).unwrap();

    assert_eq!(first, second);
    assert!(first);
    assert_eq!(calls.load(Ordering::SeqCst), 1);

    engine.clear_voter_cache();
    block_on(engine.is_granted(Some(&actor), "report.view", None)).unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}
