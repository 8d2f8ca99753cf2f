use std::path::PathBuf;

use river_core::{load_river_config_from_env, MapExtent, VertexId};

// One test per binary: the override is process-wide.
#[test]
fn environment_override_and_fallback() {
    let fixture = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join("river_config_override.json");

    std::env::set_var("RIVER_CONFIG_PATH", &fixture);
    let (config, metadata) = load_river_config_from_env();
    assert_eq!(metadata.path(), Some(&fixture));
    assert_eq!(config.outlet_id, 2);
    assert_eq!(config.source_flow, 3);
    assert_eq!(config.seepage_window, 20);
    assert_eq!(config.map_extent, MapExtent { min: 0, max: 100 });
    assert_eq!(config.network_rules().outlet, VertexId(2));

    std::env::set_var("RIVER_CONFIG_PATH", fixture.with_file_name("missing.json"));
    let (config, metadata) = load_river_config_from_env();
    assert_eq!(metadata.path(), None);
    assert_eq!(config.outlet_id, 1);

    std::env::remove_var("RIVER_CONFIG_PATH");
    let (config, metadata) = load_river_config_from_env();
    assert_eq!(metadata.path(), None);
    assert_eq!(config.seepage_window, 50);
}
