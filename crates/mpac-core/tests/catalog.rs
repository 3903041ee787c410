use std::fs;

use mpac_core::interchange::{read_formats_from_path, write_formats_to_path};
use mpac_core::{CatalogKind, CsvFileProvider, FormatProvider, MessageFormat, Registry, SinkEvent};
use tempfile::TempDir;

#[test]
fn local_catalog_export_import_cycle() {
    let temp = TempDir::new().expect("tempdir");
    let path = temp.path().join("local.csv");

    let mut registry = Registry::new();
    for format in [
        MessageFormat::new(0x01, 0x02, "Speed", 2, "g * 2 h"),
        MessageFormat::new(0x03, 0x04, "Label", 4, "a4"),
    ] {
        registry.add(format, CatalogKind::Local).expect("add local");
    }
    write_formats_to_path(&path, registry.list(CatalogKind::Local)).expect("export");

    let mut restored = Registry::new();
    restored.add(MessageFormat::new(9, 9, "Old", 0, ""), CatalogKind::Local).expect("add");
    restored.replace_local(read_formats_from_path(&path).expect("import"));

    assert_eq!(
        restored.list(CatalogKind::Local),
        registry.list(CatalogKind::Local)
    );
    assert!(restored.lookup(9, 9).is_none());
}

#[test]
fn company_refresh_from_csv_files() {
    let temp = TempDir::new().expect("tempdir");
    let first = temp.path().join("first.csv");
    let second = temp.path().join("second.csv");
    fs::write(&first, "id_high,id_low,name,length,format\n0x10,0x20,Temp,1,C C\n").unwrap();
    fs::write(&second, "0x30,0x40,Door,0,open\n0x10,0x20,Dup,0,\n").unwrap();

    let providers = [CsvFileProvider::new(&first), CsvFileProvider::new(&second)];
    let providers: Vec<&dyn FormatProvider> =
        providers.iter().map(|p| p as &dyn FormatProvider).collect();

    let mut registry = Registry::new();
    let mut events: Vec<SinkEvent> = Vec::new();
    let loaded = registry
        .refresh_company(&providers, &mut events)
        .expect("refresh");

    assert_eq!(loaded, 3);
    assert_eq!(registry.count(CatalogKind::Company), 3);
    assert_eq!(registry.lookup(0x10, 0x20).expect("temp").0.name, "Temp");
    assert_eq!(events.len(), 4);
}
