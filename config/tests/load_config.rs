use std::path::Path;

use wallspeed_config::Config;

#[test]
fn test_overrides_one_section_and_keeps_other_defaults() {
    let dir = std::env::temp_dir().join("wallspeed_config_integration_test");
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join("config.toml");
    std::fs::write(
        &path,
        "[polynomial_grid]\nspatial_grid_size = 40\nmomentum_grid_size = 21\n",
    )
    .unwrap();

    let config = Config::load(Some(&path));
    assert_eq!(config.polynomial_grid.spatial_grid_size, 40);
    assert_eq!(config.polynomial_grid.momentum_grid_size, 21);
    assert_eq!(config.eom.max_iterations, 50);
    assert_eq!(config.hydrodynamics.tmax, 10.0);
}

#[test]
fn test_load_with_no_path_and_no_file_falls_back_to_default() {
    let config = Config::load(Some(Path::new("/definitely/not/a/real/config.toml")));
    assert_eq!(config.polynomial_grid.spatial_grid_size, 20);
    assert!(config.data_files.interpolation_table_jb.is_none());
}
