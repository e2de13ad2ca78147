use boomplan::layout::EdgeId;
use boomplan::{BoomConfig, BoomStore, HubMode, Warning};

fn edge_length(store: &mut BoomStore, id: &str) -> Option<u32> {
    let id = EdgeId::parse(id)?;
    let layout = store.layout().ok()?;
    layout.edges().iter().find(|e| e.id == id).map(|e| e.length_ft)
}

#[test]
fn override_pins_exact_length() {
    let mut config = BoomConfig { total_nozzles: 54, nozzle_spacing: 20.0, ..Default::default() };
    config.set_slot(1, 1, 12, 0);
    config.set_slot(2, 1, 6, 0);
    let mut store = BoomStore::new(config);

    assert_eq!(edge_length(&mut store, "hub->vcm:18"), Some(25));
    store.set_override("hub<->vcm:18", "12").unwrap();
    assert_eq!(edge_length(&mut store, "hub->vcm:18"), Some(12));

    let layout = store.layout().unwrap();
    let edge = layout.edges().iter().find(|e| e.overridden).unwrap();
    assert_eq!((edge.computed_ft, edge.length_ft), (25, 12));
}

#[test]
fn saved_boom_reloads_identically() {
    let mut store = BoomStore::default();
    store.update(|c| {
        c.name = "Demo 90'".into();
        c.five_foot_drops = vec![1, 54];
    });
    store.set_override("hub->vcm:25", "12").unwrap();
    store.generate_install().unwrap();

    let json = store.to_json();
    let mut reloaded = BoomStore::from_json(&json);
    assert!(reloaded.load_warnings().is_empty());
    assert_eq!(reloaded.config(), store.config());
    assert_eq!(reloaded.config().install_steps.version, 1);
    assert_eq!(edge_length(&mut reloaded, "hub->vcm:25"), Some(12));
}

#[test]
fn broken_file_loads_as_empty_boom() {
    let mut store = BoomStore::from_json("not a config");
    assert!(matches!(store.load_warnings(), [Warning::UnreadableConfig { .. }]));
    assert!(store.layout().is_err());
}

#[test]
fn bad_stored_overrides_are_reported_not_fatal() {
    let json = r#"{
        "totalNozzles": 54,
        "nozzleSpacing": 20,
        "ports": { "1": { "v1": { "nozzles": 12 } }, "2": { "v1": { "nozzles": 6 } } },
        "extensionOverrides": { "hub->vcm:18": "long", "hub->vcm:6.5": 0, "vcm:6.5->vcm:18": 9 }
    }"#;
    let mut store = BoomStore::from_json(json);
    assert_eq!(store.load_warnings().len(), 2);
    assert_eq!(store.config().extension_overrides.len(), 1);
    // the bad value falls back to the estimate
    assert_eq!(edge_length(&mut store, "hub->vcm:18"), Some(25));
}

#[test]
fn overrides_survive_unrelated_edits_until_cleared() {
    let mut store = BoomStore::default();
    store.set_override("hub->vcm:25", "12").unwrap();

    // moving 2-1 retires its edge; the override stays put but is unused
    store.update(|c| c.set_slot(2, 1, 6, -3));
    assert_eq!(edge_length(&mut store, "hub->vcm:25"), None);
    assert_eq!(store.config().extension_overrides.len(), 1);

    store.update(|c| c.set_slot(2, 1, 6, 0));
    assert_eq!(edge_length(&mut store, "hub->vcm:25"), Some(12));

    store.clear_overrides();
    assert_eq!(edge_length(&mut store, "hub->vcm:25"), Some(10));
}

#[test]
fn hub_mode_switch_rebuilds_chains() {
    let mut store = BoomStore::default();
    store.set_override("hub->vcm:36.5", "40").unwrap();
    store.set_hub_mode(HubMode::Lite);

    let layout = store.layout().unwrap();
    assert_eq!(layout.bom[0].part_number, "123000-130");
    assert!(layout.edges().iter().all(|e| !e.overridden));
}

#[test]
fn stamped_instructions_follow_the_boom() {
    let mut store = BoomStore::default();
    store.generate_install().unwrap();
    let first = store.config().install_steps.content.clone();
    assert!(first.contains("Port 3: Install chain terminator at outermost VCM 3-2."));

    store.update(|c| c.set_slot(3, 2, 0, 0));
    store.generate_install().unwrap();
    let steps = &store.config().install_steps;
    assert_eq!(steps.version, 2);
    assert!(steps.content.contains("Port 3: Install chain terminator at outermost VCM 3-1."));
}
