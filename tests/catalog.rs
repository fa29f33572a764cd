use tempfile::TempDir;

use appstore_catalog::catalog::types::{
    ApplicationPayload, ListFilters, Maintainer, Perspective, PlatformSpec,
};
use appstore_catalog::catalog::{CatalogError, CatalogStore};
use appstore_catalog::identifier::VersionSelector;

const NATIVE: &str = "application/vnd.rdk-app.dac.native";
const WEB: &str = "application/vnd.rdk-app.html5";

fn open_store(temp_dir: &TempDir) -> CatalogStore {
    CatalogStore::new(&temp_dir.path().join("catalog.db")).unwrap()
}

fn maintainer(code: &str) -> Maintainer {
    Maintainer {
        code: code.to_string(),
        name: format!("{code} studios"),
        address: Some("1 Example Street".to_string()),
        homepage: Some(format!("https://{code}.example.com")),
        email: None,
    }
}

fn payload(name: &str, visible: bool) -> ApplicationPayload {
    ApplicationPayload {
        name: name.to_string(),
        app_type: NATIVE.to_string(),
        visible,
        preferred: false,
        description: Some(format!("{name} description")),
        icon: None,
        category: Some("application".to_string()),
        size: Some(10_000_000),
        localizations: indexmap::IndexMap::new(),
        platform: Some(PlatformSpec {
            architecture: "arm".to_string(),
            variant: None,
            os: Some("linux".to_string()),
        }),
        dependencies: Vec::new(),
        features: Vec::new(),
        hardware: None,
        source_url: None,
    }
}

fn exact(version: &str) -> VersionSelector {
    VersionSelector::Exact(version.to_string())
}

fn latest_flags(store: &CatalogStore, code: &str, app_id: &str, version: &str) -> (bool, bool) {
    let details = store
        .get_details(&Perspective::maintainer(code), app_id, &exact(version))
        .unwrap()
        .unwrap();
    (details.latest.maintainer, details.latest.stb)
}

#[test]
fn single_visible_version_is_latest_for_both_perspectives() {
    let temp_dir = TempDir::new().unwrap();
    let store = open_store(&temp_dir);
    store.create_maintainer(&maintainer("lgi")).unwrap();

    store
        .add_version("lgi", "com.vendor.app", "1.0", &payload("App", true))
        .unwrap();

    assert_eq!(
        latest_flags(&store, "lgi", "com.vendor.app", "1.0"),
        (true, true)
    );

    let stb = store
        .get_details(&Perspective::Stb, "com.vendor.app", &VersionSelector::Latest)
        .unwrap()
        .unwrap();
    assert_eq!(stb.version, "1.0");
}

#[test]
fn hidden_newer_version_diverges_the_latest_pointers() {
    let temp_dir = TempDir::new().unwrap();
    let store = open_store(&temp_dir);
    store.create_maintainer(&maintainer("lgi")).unwrap();

    store
        .add_version("lgi", "com.vendor.app", "1.0", &payload("App", true))
        .unwrap();
    store
        .add_version("lgi", "com.vendor.app", "2.0", &payload("App", false))
        .unwrap();

    // 2.0 leads for the maintainer but is invisible to devices
    assert_eq!(
        latest_flags(&store, "lgi", "com.vendor.app", "2.0"),
        (true, false)
    );
    assert_eq!(
        latest_flags(&store, "lgi", "com.vendor.app", "1.0"),
        (false, true)
    );

    let stb = store
        .get_details(&Perspective::Stb, "com.vendor.app", &VersionSelector::Latest)
        .unwrap()
        .unwrap();
    assert_eq!(stb.version, "1.0");
}

#[test]
fn version_ranking_is_numeric_not_lexicographic() {
    let temp_dir = TempDir::new().unwrap();
    let store = open_store(&temp_dir);
    store.create_maintainer(&maintainer("lgi")).unwrap();

    for version in ["2.9.9", "10.1.3", "9.0"] {
        store
            .add_version("lgi", "com.vendor.app", version, &payload("App", true))
            .unwrap();
    }

    let details = store
        .get_details(
            &Perspective::maintainer("lgi"),
            "com.vendor.app",
            &VersionSelector::Latest,
        )
        .unwrap()
        .unwrap();
    assert_eq!(details.version, "10.1.3");

    let listed: Vec<&str> = details.versions.iter().map(|v| v.version.as_str()).collect();
    assert_eq!(listed, vec!["10.1.3", "9.0", "2.9.9"]);
}

#[test]
fn deleting_the_latest_version_reassigns_both_pointers() {
    let temp_dir = TempDir::new().unwrap();
    let store = open_store(&temp_dir);
    store.create_maintainer(&maintainer("lgi")).unwrap();

    store
        .add_version("lgi", "com.vendor.app", "1.0", &payload("App", true))
        .unwrap();
    store
        .add_version("lgi", "com.vendor.app", "1.1", &payload("App", true))
        .unwrap();

    let deleted = store
        .delete_version("lgi", "com.vendor.app", &VersionSelector::Latest)
        .unwrap();
    assert!(deleted);

    assert_eq!(
        latest_flags(&store, "lgi", "com.vendor.app", "1.0"),
        (true, true)
    );
    assert_eq!(
        store
            .get_details(&Perspective::maintainer("lgi"), "com.vendor.app", &exact("1.1"))
            .unwrap(),
        None
    );
}

#[test]
fn exactly_one_maintainer_latest_after_any_mutation_sequence() {
    let temp_dir = TempDir::new().unwrap();
    let store = open_store(&temp_dir);
    store.create_maintainer(&maintainer("lgi")).unwrap();

    let versions = ["0.9", "1.0", "1.0.1", "2.0", "1.10"];
    for (i, version) in versions.iter().enumerate() {
        store
            .add_version("lgi", "com.vendor.app", version, &payload("App", i % 2 == 0))
            .unwrap();
    }
    store
        .delete_version("lgi", "com.vendor.app", &exact("2.0"))
        .unwrap();
    store
        .update_version("lgi", "com.vendor.app", &exact("1.10"), &payload("App", false))
        .unwrap();

    // Remaining: 0.9(v), 1.0(x), 1.0.1(v), 1.10(x). Maintainer-latest is
    // 1.10, stb-latest the highest visible: 1.0.1.
    let mut maintainer_latest = Vec::new();
    let mut stb_latest = Vec::new();
    for version in ["0.9", "1.0", "1.0.1", "1.10"] {
        let (m, s) = latest_flags(&store, "lgi", "com.vendor.app", version);
        if m {
            maintainer_latest.push(version);
        }
        if s {
            stb_latest.push(version);
        }
    }
    assert_eq!(maintainer_latest, vec!["1.10"]);
    assert_eq!(stb_latest, vec!["1.0.1"]);
}

#[test]
fn hiding_the_shared_latest_moves_only_the_stb_pointer() {
    let temp_dir = TempDir::new().unwrap();
    let store = open_store(&temp_dir);
    store.create_maintainer(&maintainer("lgi")).unwrap();

    store
        .add_version("lgi", "com.vendor.app", "1.0", &payload("App", true))
        .unwrap();
    store
        .add_version("lgi", "com.vendor.app", "2.0", &payload("App", true))
        .unwrap();
    assert_eq!(
        latest_flags(&store, "lgi", "com.vendor.app", "2.0"),
        (true, true)
    );

    store
        .update_version("lgi", "com.vendor.app", &exact("2.0"), &payload("App", false))
        .unwrap();

    assert_eq!(
        latest_flags(&store, "lgi", "com.vendor.app", "2.0"),
        (true, false)
    );
    assert_eq!(
        latest_flags(&store, "lgi", "com.vendor.app", "1.0"),
        (false, true)
    );
}

#[test]
fn recomputation_is_idempotent_across_no_op_updates() {
    let temp_dir = TempDir::new().unwrap();
    let store = open_store(&temp_dir);
    store.create_maintainer(&maintainer("lgi")).unwrap();

    store
        .add_version("lgi", "com.vendor.app", "1.0", &payload("App", true))
        .unwrap();
    store
        .add_version("lgi", "com.vendor.app", "2.0", &payload("App", false))
        .unwrap();

    let before: Vec<(bool, bool)> = ["1.0", "2.0"]
        .iter()
        .map(|v| latest_flags(&store, "lgi", "com.vendor.app", v))
        .collect();

    // Re-writing a row with identical state re-runs the recomputation
    for _ in 0..2 {
        store
            .update_version("lgi", "com.vendor.app", &exact("1.0"), &payload("App", true))
            .unwrap();
    }

    let after: Vec<(bool, bool)> = ["1.0", "2.0"]
        .iter()
        .map(|v| latest_flags(&store, "lgi", "com.vendor.app", v))
        .collect();
    assert_eq!(before, after);
}

#[test]
fn stb_perspective_never_sees_hidden_versions() {
    let temp_dir = TempDir::new().unwrap();
    let store = open_store(&temp_dir);
    store.create_maintainer(&maintainer("lgi")).unwrap();

    store
        .add_version("lgi", "com.vendor.app", "1.0", &payload("App", false))
        .unwrap();

    // Hidden exactly addressed: still invisible to devices
    assert_eq!(
        store
            .get_details(&Perspective::Stb, "com.vendor.app", &exact("1.0"))
            .unwrap(),
        None
    );
    // No visible version at all: no stb latest either
    assert_eq!(
        store
            .get_details(&Perspective::Stb, "com.vendor.app", &VersionSelector::Latest)
            .unwrap(),
        None
    );
    // The maintainer still resolves it
    assert!(
        store
            .get_details(&Perspective::maintainer("lgi"), "com.vendor.app", &exact("1.0"))
            .unwrap()
            .is_some()
    );
}

#[test]
fn preferred_flag_breaks_ties_between_maintainers() {
    let temp_dir = TempDir::new().unwrap();
    let store = open_store(&temp_dir);
    store.create_maintainer(&maintainer("alpha")).unwrap();
    store.create_maintainer(&maintainer("beta")).unwrap();

    // Two maintainers publish the same appId; each group carries its own
    // stb-latest, so a device "latest" read matches two rows.
    store
        .add_version("alpha", "com.vendor.app", "1.0", &payload("Alpha build", true))
        .unwrap();
    let mut preferred = payload("Beta build", true);
    preferred.preferred = true;
    store
        .add_version("beta", "com.vendor.app", "0.9", &preferred)
        .unwrap();

    let details = store
        .get_details(&Perspective::Stb, "com.vendor.app", &VersionSelector::Latest)
        .unwrap()
        .unwrap();
    assert_eq!(details.maintainer.code, "beta");
    assert_eq!(details.version, "0.9");
}

#[test]
fn without_preferred_the_highest_version_wins_the_tie() {
    let temp_dir = TempDir::new().unwrap();
    let store = open_store(&temp_dir);
    store.create_maintainer(&maintainer("alpha")).unwrap();
    store.create_maintainer(&maintainer("beta")).unwrap();

    store
        .add_version("alpha", "com.vendor.app", "1.0", &payload("Alpha build", true))
        .unwrap();
    store
        .add_version("beta", "com.vendor.app", "2.0", &payload("Beta build", true))
        .unwrap();

    let details = store
        .get_details(&Perspective::Stb, "com.vendor.app", &VersionSelector::Latest)
        .unwrap()
        .unwrap();
    assert_eq!(details.version, "2.0");
    assert_eq!(details.maintainer.code, "beta");
}

#[test]
fn delete_all_empties_the_group_without_error() {
    let temp_dir = TempDir::new().unwrap();
    let store = open_store(&temp_dir);
    store.create_maintainer(&maintainer("lgi")).unwrap();

    for version in ["1.0", "1.1", "2.0"] {
        store
            .add_version("lgi", "com.vendor.app", version, &payload("App", true))
            .unwrap();
    }

    assert!(
        store
            .delete_version("lgi", "com.vendor.app", &VersionSelector::All)
            .unwrap()
    );
    assert_eq!(
        store
            .get_details(
                &Perspective::maintainer("lgi"),
                "com.vendor.app",
                &VersionSelector::Latest
            )
            .unwrap(),
        None
    );
    // A second delete finds nothing
    assert!(
        !store
            .delete_version("lgi", "com.vendor.app", &VersionSelector::All)
            .unwrap()
    );
}

#[test]
fn details_version_list_follows_the_perspective() {
    let temp_dir = TempDir::new().unwrap();
    let store = open_store(&temp_dir);
    store.create_maintainer(&maintainer("lgi")).unwrap();

    store
        .add_version("lgi", "com.vendor.app", "1.0", &payload("App", true))
        .unwrap();
    store
        .add_version("lgi", "com.vendor.app", "2.0", &payload("App", false))
        .unwrap();

    let maintainer_view = store
        .get_details(
            &Perspective::maintainer("lgi"),
            "com.vendor.app",
            &VersionSelector::Latest,
        )
        .unwrap()
        .unwrap();
    let maintainer_versions: Vec<&str> = maintainer_view
        .versions
        .iter()
        .map(|v| v.version.as_str())
        .collect();
    assert_eq!(maintainer_versions, vec!["2.0", "1.0"]);

    let stb_view = store
        .get_details(&Perspective::Stb, "com.vendor.app", &VersionSelector::Latest)
        .unwrap()
        .unwrap();
    let stb_versions: Vec<&str> = stb_view.versions.iter().map(|v| v.version.as_str()).collect();
    assert_eq!(stb_versions, vec!["1.0"]);
}

#[test]
fn listing_returns_only_latest_rows_unless_version_is_pinned() {
    let temp_dir = TempDir::new().unwrap();
    let store = open_store(&temp_dir);
    store.create_maintainer(&maintainer("lgi")).unwrap();

    for version in ["1.0", "2.0"] {
        store
            .add_version("lgi", "com.vendor.app", version, &payload("App", true))
            .unwrap();
    }
    store
        .add_version("lgi", "com.vendor.game", "0.1", &payload("Game", true))
        .unwrap();

    let page = store
        .list_versions(
            &Perspective::maintainer("lgi"),
            &ListFilters::default(),
            0,
            10,
        )
        .unwrap();
    assert_eq!(page.total, 2);
    let rows: Vec<(&str, &str)> = page
        .items
        .iter()
        .map(|r| (r.app_id.as_str(), r.version.as_str()))
        .collect();
    assert_eq!(rows, vec![("com.vendor.app", "2.0"), ("com.vendor.game", "0.1")]);

    let pinned = store
        .list_versions(
            &Perspective::maintainer("lgi"),
            &ListFilters {
                version: Some("1.0".to_string()),
                ..ListFilters::default()
            },
            0,
            10,
        )
        .unwrap();
    assert_eq!(pinned.total, 1);
    assert_eq!(pinned.items[0].version, "1.0");
    assert!(!pinned.items[0].latest.maintainer);
}

#[test]
fn listing_applies_filters_and_pagination() {
    let temp_dir = TempDir::new().unwrap();
    let store = open_store(&temp_dir);
    store.create_maintainer(&maintainer("lgi")).unwrap();

    store
        .add_version("lgi", "com.vendor.app", "1.0", &payload("Awesome App", true))
        .unwrap();
    let mut web = payload("Web Portal", true);
    web.app_type = WEB.to_string();
    web.platform = Some(PlatformSpec {
        architecture: "x86".to_string(),
        variant: None,
        os: Some("linux".to_string()),
    });
    web.source_url = Some("https://portal.example.com".to_string());
    store
        .add_version("lgi", "com.vendor.portal", "3.0", &web)
        .unwrap();

    let by_name = store
        .list_versions(
            &Perspective::Stb,
            &ListFilters {
                name: Some("Awesome".to_string()),
                ..ListFilters::default()
            },
            0,
            10,
        )
        .unwrap();
    assert_eq!(by_name.total, 1);
    assert_eq!(by_name.items[0].app_id, "com.vendor.app");

    let by_type = store
        .list_versions(
            &Perspective::Stb,
            &ListFilters {
                app_type: Some("html5".to_string()),
                ..ListFilters::default()
            },
            0,
            10,
        )
        .unwrap();
    assert_eq!(by_type.total, 1);
    assert_eq!(by_type.items[0].app_id, "com.vendor.portal");

    let by_arch = store
        .list_versions(
            &Perspective::Stb,
            &ListFilters {
                platform_architecture: Some("x86".to_string()),
                ..ListFilters::default()
            },
            0,
            10,
        )
        .unwrap();
    assert_eq!(by_arch.total, 1);

    let paged = store
        .list_versions(&Perspective::Stb, &ListFilters::default(), 1, 1)
        .unwrap();
    assert_eq!(paged.total, 2);
    assert_eq!(paged.items.len(), 1);
}

#[test]
fn stb_listing_hides_invisible_apps_entirely() {
    let temp_dir = TempDir::new().unwrap();
    let store = open_store(&temp_dir);
    store.create_maintainer(&maintainer("lgi")).unwrap();

    store
        .add_version("lgi", "com.vendor.hidden", "1.0", &payload("Hidden", false))
        .unwrap();
    store
        .add_version("lgi", "com.vendor.app", "1.0", &payload("App", true))
        .unwrap();

    let page = store
        .list_versions(&Perspective::Stb, &ListFilters::default(), 0, 10)
        .unwrap();
    assert_eq!(page.total, 1);
    assert_eq!(page.items[0].app_id, "com.vendor.app");
}

#[test]
fn get_details_rejects_the_all_selector() {
    let temp_dir = TempDir::new().unwrap();
    let store = open_store(&temp_dir);
    store.create_maintainer(&maintainer("lgi")).unwrap();

    let err = store
        .get_details(
            &Perspective::maintainer("lgi"),
            "com.vendor.app",
            &VersionSelector::All,
        )
        .unwrap_err();
    assert!(matches!(err, CatalogError::InvalidSelector(_)));
}
