use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use skinpkg_cli::export::{export_theme, ExportOptions};
use skinpkg_cli::importer::{ImportError, Importer};
use skinpkg_cli::lock::ImportLock;
use skinpkg_cli::notify::MessageSink;
use skinpkg_cli::validate::{ManifestValidationError, ManifestValidator, StructuralValidator};
use skinpkg_core::manifest::ThemeManifest;
use skinpkg_core::types::FontSlot;
use skinpkg_pack::pack::pack_theme;
use skinpkg_resolve::layout::DeviceLayout;
use skinpkg_resolve::registry::SystemRegistry;
use tempfile::TempDir;

const ACCENTS: &str = "color1=#FF0000\ncolor2=0x00FF00\ncolor3=0x0000FF\n\
                       color4=0xFFFFFF\ncolor5=0x000000\ncolor6=0x888888\n";

const LEDS: &str = "\
[F1 key]
effect=1
color1=0xFFFFFF
color2=0x000000
speed=1000
brightness=100
trigger=1
inbrightness=100

[F2 key]
effect=2
color1=0xFF0000
color2=0x000000
speed=500
brightness=80
trigger=1
inbrightness=50

[Top bar]
effect=3
color1=0x00FF00
color2=0x0000FF
speed=250
brightness=60
trigger=2
inbrightness=40

[L&R triggers]
effect=4
color1=0x123456
color2=0x654321
speed=100
brightness=20
trigger=3
inbrightness=10
";

fn write(root: &Path, rel: &str, contents: &[u8]) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, contents).unwrap();
}

#[derive(Clone, Default)]
struct RecordingSink(Arc<Mutex<Vec<String>>>);

impl MessageSink for RecordingSink {
    fn show(&self, message: &str) {
        self.0.lock().unwrap().push(message.to_owned());
    }
}

/// A device with one installed system, one tool, one collection and factory fonts.
fn device() -> (TempDir, DeviceLayout) {
    let dir = TempDir::new().unwrap();
    let layout = DeviceLayout::new(dir.path(), "tg5040");
    fs::create_dir_all(layout.roms_root.join("Game Boy (GB)")).unwrap();
    fs::create_dir_all(layout.tools_root.join("Clock")).unwrap();
    fs::create_dir_all(layout.collections_root.join("Favorites")).unwrap();
    write(dir.path(), ".system/res/font1.ttf", b"factory-og");
    write(dir.path(), ".system/res/font2.ttf", b"factory-next");
    (dir, layout)
}

fn package(themes: &Path, name: &str) -> PathBuf {
    let pkg = themes.join(name);
    write(&pkg, "Wallpapers/SystemWallpapers/Root.png", b"root-bg");
    write(&pkg, "Wallpapers/SystemWallpapers/Game Boy (GB).png", b"gb-bg");
    write(&pkg, "Icons/SystemIcons/Game Boy (GB).png", b"gb-icon");
    write(&pkg, "Icons/SystemIcons/Tools.png", b"tools-icon");
    write(&pkg, "Icons/ToolIcons/Clock.png", b"clock-icon");
    write(&pkg, "Overlays/GB/grid.png", b"overlay");
    write(&pkg, "Fonts/OG.ttf", b"custom-og");
    write(&pkg, "Settings/minuisettings.txt", ACCENTS.as_bytes());
    pkg
}

fn importer(layout: &DeviceLayout, sink: RecordingSink) -> Importer {
    Importer::new(layout.clone(), Box::new(StructuralValidator), Box::new(sink))
}

#[test]
fn import_applies_every_category() {
    let (_dev, layout) = device();
    let themes = TempDir::new().unwrap();
    let pkg = package(themes.path(), "Midnight.theme");
    fs::create_dir_all(layout.accent_settings.parent().unwrap()).unwrap();
    fs::write(&layout.accent_settings, "volume=5\ncolor1=#000000\n").unwrap();

    let sink = RecordingSink::default();
    let report = importer(&layout, sink.clone()).import(&pkg).unwrap();

    let gb_media = layout.roms_root.join("Game Boy (GB)/.media");
    assert_eq!(fs::read(&layout.root_background).unwrap(), b"root-bg");
    assert_eq!(fs::read(gb_media.join("bg.png")).unwrap(), b"gb-bg");
    assert_eq!(fs::read(gb_media.join("icon.png")).unwrap(), b"gb-icon");
    assert_eq!(fs::read(&layout.tools_icon).unwrap(), b"tools-icon");
    assert_eq!(
        fs::read(layout.tool_media_dir("Clock").join("icon.png")).unwrap(),
        b"clock-icon"
    );
    assert_eq!(
        fs::read(layout.overlays_root.join("GB/grid.png")).unwrap(),
        b"overlay"
    );
    assert_eq!(fs::read(&layout.og_font).unwrap(), b"custom-og");
    assert_eq!(fs::read(&layout.og_font_backup).unwrap(), b"factory-og");
    assert_eq!(fs::read(&layout.next_font).unwrap(), b"factory-next");

    let accents = fs::read_to_string(&layout.accent_settings).unwrap();
    assert!(accents.contains("color1=#FF0000"));
    assert!(accents.contains("volume=5"));
    assert_eq!(accents.matches("color1=").count(), 1);

    assert_eq!(report.theme_name, "Midnight");
    assert_eq!(report.font_backups, [FontSlot::OgFont]);
    assert_eq!(report.skipped, 0);
    assert_eq!(report.failed, 0);
    assert!(report.accents_applied);
    assert!(!report.leds_applied);
    assert_eq!(*sink.0.lock().unwrap(), ["Applied theme 'Midnight'"]);
    assert!(ImportLock::acquire(&layout.import_lock).is_ok());
}

#[test]
fn factory_font_backup_is_never_overwritten() {
    let (_dev, layout) = device();
    let themes = TempDir::new().unwrap();
    let first = package(themes.path(), "First.theme");
    importer(&layout, RecordingSink::default()).import(&first).unwrap();

    let second = themes.path().join("Second.theme");
    write(&second, "Fonts/OG.ttf", b"second-og");
    let report = importer(&layout, RecordingSink::default())
        .import(&second)
        .unwrap();

    assert!(report.font_backups.is_empty());
    assert_eq!(fs::read(&layout.og_font).unwrap(), b"second-og");
    assert_eq!(fs::read(&layout.og_font_backup).unwrap(), b"factory-og");
}

#[test]
fn import_purges_assets_the_new_theme_does_not_provide() {
    let (_dev, layout) = device();
    let themes = TempDir::new().unwrap();
    let first = package(themes.path(), "First.theme");
    importer(&layout, RecordingSink::default()).import(&first).unwrap();
    assert!(layout.tools_icon.exists());

    let second = themes.path().join("Second.theme");
    write(&second, "Wallpapers/SystemWallpapers/Root.png", b"second-bg");
    importer(&layout, RecordingSink::default())
        .import(&second)
        .unwrap();

    assert_eq!(fs::read(&layout.root_background).unwrap(), b"second-bg");
    assert!(!layout.tools_icon.exists());
    assert!(!layout.roms_root.join("Game Boy (GB)/.media/icon.png").exists());
    assert!(!layout.tool_media_dir("Clock").join("icon.png").exists());
}

/// Removes a package file after the manifest was derived, as if the package
/// changed between scan and copy.
struct RemovingValidator(PathBuf);

impl ManifestValidator for RemovingValidator {
    fn validate(&self, _: &ThemeManifest, _: &DeviceLayout) -> Result<(), ManifestValidationError> {
        fs::remove_file(&self.0).unwrap();
        Ok(())
    }
}

#[test]
fn missing_source_is_skipped_and_import_continues() {
    let (_dev, layout) = device();
    let themes = TempDir::new().unwrap();
    let pkg = package(themes.path(), "Midnight.theme");
    let validator = RemovingValidator(pkg.join("Icons/ToolIcons/Clock.png"));

    let report = Importer::new(
        layout.clone(),
        Box::new(validator),
        Box::new(RecordingSink::default()),
    )
    .import(&pkg)
    .unwrap();

    assert_eq!(report.skipped, 1);
    assert!(!layout.tool_media_dir("Clock").join("icon.png").exists());
    assert!(layout.root_background.exists());
}

/// Rejects every manifest.
struct RejectingValidator;

impl ManifestValidator for RejectingValidator {
    fn validate(&self, _: &ThemeManifest, _: &DeviceLayout) -> Result<(), ManifestValidationError> {
        Err(ManifestValidationError::MissingName)
    }
}

#[test]
fn validation_failure_aborts_before_copying() {
    let (_dev, layout) = device();
    let themes = TempDir::new().unwrap();
    let pkg = package(themes.path(), "Broken.theme");

    let sink = RecordingSink::default();
    let err = Importer::new(
        layout.clone(),
        Box::new(RejectingValidator),
        Box::new(sink.clone()),
    )
    .import(&pkg)
    .unwrap_err();

    assert!(matches!(err, ImportError::Validation(_)));
    assert!(!layout.root_background.exists());
    assert!(!layout.og_font_backup.exists());
    assert!(sink.0.lock().unwrap().is_empty());
    assert!(ImportLock::acquire(&layout.import_lock).is_ok());
}

#[test]
fn bad_accent_color_skips_only_accents() {
    let (_dev, layout) = device();
    let themes = TempDir::new().unwrap();
    let pkg = package(themes.path(), "Odd.theme");
    write(
        &pkg,
        "Settings/minuisettings.txt",
        ACCENTS.replace("#FF0000", "red").as_bytes(),
    );
    write(&pkg, "Settings/ledsettings_brick.txt", LEDS.as_bytes());

    let report = importer(&layout, RecordingSink::default())
        .import(&pkg)
        .unwrap();

    assert!(!report.accents_applied);
    assert!(report.leds_applied);
    assert_eq!(report.failed, 1);
    assert!(!layout.accent_settings.exists());
    assert_eq!(fs::read(&layout.root_background).unwrap(), b"root-bg");
}

#[test]
fn led_settings_reach_the_device() {
    let (_dev, layout) = device();
    let themes = TempDir::new().unwrap();
    let pkg = package(themes.path(), "Glow.theme");
    write(&pkg, "Settings/ledsettings_brick.txt", LEDS.as_bytes());

    let report = importer(&layout, RecordingSink::default())
        .import(&pkg)
        .unwrap();
    assert!(report.leds_applied);
    assert_eq!(report.failed, 0);

    let written = fs::read_to_string(&layout.led_settings).unwrap();
    let sections: Vec<&str> = written
        .lines()
        .filter(|l| l.starts_with('['))
        .collect();
    assert_eq!(sections, ["[F1 key]", "[F2 key]", "[Top bar]", "[L&R triggers]"]);

    let top_bar = written
        .split("\n\n")
        .find(|block| block.starts_with("[Top bar]"))
        .unwrap();
    for line in [
        "effect=3",
        "color1=0x00FF00",
        "color2=0x0000FF",
        "speed=250",
        "brightness=60",
        "trigger=2",
        "inbrightness=40",
    ] {
        assert!(top_bar.lines().any(|l| l == line), "missing {line}");
    }
    assert!(written.contains("color2=0x654321\n"));
}

#[test]
fn partial_led_file_leaves_device_leds_and_other_categories() {
    let (_dev, layout) = device();
    let themes = TempDir::new().unwrap();
    let pkg = package(themes.path(), "Half.theme");
    let partial = LEDS.replace("color1=0x00FF00\ncolor2=0x0000FF\n", "");
    write(&pkg, "Settings/ledsettings_brick.txt", partial.as_bytes());
    fs::create_dir_all(layout.led_settings.parent().unwrap()).unwrap();
    fs::write(&layout.led_settings, "factory leds\n").unwrap();

    let report = importer(&layout, RecordingSink::default())
        .import(&pkg)
        .unwrap();

    assert!(!report.leds_applied);
    assert!(report.accents_applied);
    assert_eq!(fs::read_to_string(&layout.led_settings).unwrap(), "factory leds\n");
    assert_eq!(fs::read(&layout.root_background).unwrap(), b"root-bg");
    assert_eq!(fs::read(&layout.og_font).unwrap(), b"custom-og");
}

#[test]
fn single_accent_line_reaches_the_device() {
    let (_dev, layout) = device();
    let themes = TempDir::new().unwrap();
    let pkg = package(themes.path(), "Red.theme");
    write(&pkg, "Settings/minuisettings.txt", b"color1=#FF0000\n");
    fs::create_dir_all(layout.accent_settings.parent().unwrap()).unwrap();
    fs::write(
        &layout.accent_settings,
        "color1=0x111111\ncolor2=0x222222\nvolume=5\n",
    )
    .unwrap();

    let report = importer(&layout, RecordingSink::default())
        .import(&pkg)
        .unwrap();

    assert!(report.accents_applied);
    assert_eq!(
        fs::read_to_string(&layout.accent_settings).unwrap(),
        "color1=#FF0000\ncolor2=0x222222\nvolume=5\n"
    );
}

#[test]
fn unreadable_registry_is_fatal() {
    let dir = TempDir::new().unwrap();
    let layout = DeviceLayout::new(dir.path(), "tg5040");
    let themes = TempDir::new().unwrap();
    let pkg = package(themes.path(), "Midnight.theme");

    let err = importer(&layout, RecordingSink::default())
        .import(&pkg)
        .unwrap_err();
    assert!(matches!(err, ImportError::Registry(_)));
}

#[test]
fn concurrent_import_is_rejected() {
    let (_dev, layout) = device();
    let themes = TempDir::new().unwrap();
    let pkg = package(themes.path(), "Midnight.theme");
    let held = ImportLock::acquire(&layout.import_lock).unwrap();

    let err = importer(&layout, RecordingSink::default())
        .import(&pkg)
        .unwrap_err();
    assert!(matches!(err, ImportError::Busy(_)));
    assert!(!layout.root_background.exists());

    drop(held);
    assert!(importer(&layout, RecordingSink::default()).import(&pkg).is_ok());
}

#[test]
fn lock_file_left_by_a_crashed_import_does_not_block() {
    let (_dev, layout) = device();
    let themes = TempDir::new().unwrap();
    let pkg = package(themes.path(), "Midnight.theme");
    fs::create_dir_all(layout.import_lock.parent().unwrap()).unwrap();
    fs::write(&layout.import_lock, "999999\n").unwrap();

    let report = importer(&layout, RecordingSink::default())
        .import(&pkg)
        .unwrap();
    assert_eq!(report.theme_name, "Midnight");
    assert_eq!(fs::read(&layout.root_background).unwrap(), b"root-bg");
}

#[test]
fn import_accepts_packed_archive() {
    let (_dev, layout) = device();
    let themes = TempDir::new().unwrap();
    let pkg = package(themes.path(), "Midnight.theme");
    importer(&layout, RecordingSink::default()).import(&pkg).unwrap();
    fs::remove_file(&layout.root_background).unwrap();

    let archive = themes.path().join("Midnight.theme.tar.gz");
    pack_theme(&pkg, &archive).unwrap();
    let report = importer(&layout, RecordingSink::default())
        .import_path(&archive)
        .unwrap();

    assert_eq!(report.theme_name, "Midnight");
    assert_eq!(fs::read(&layout.root_background).unwrap(), b"root-bg");
}

#[test]
fn exported_theme_imports_onto_same_paths() {
    let (_dev, layout) = device();
    let themes = TempDir::new().unwrap();
    let pkg = package(themes.path(), "Original.theme");
    importer(&layout, RecordingSink::default()).import(&pkg).unwrap();

    let registry = SystemRegistry::load(&layout).unwrap();
    let exported = themes.path().join("Copy.theme");
    let manifest = export_theme(
        &layout,
        &registry,
        &exported,
        &ExportOptions::new("Copy", "tester"),
    )
    .unwrap();
    assert_eq!(manifest.theme_info.author, "tester");
    assert!(manifest.content.fonts.og_replaced);
    assert!(manifest.content.settings.accents_included);
    assert_eq!(
        fs::read(exported.join("Fonts/OG.backup.ttf")).unwrap(),
        b"factory-og"
    );

    let (_dev2, other) = device();
    importer(&other, RecordingSink::default())
        .import(&exported)
        .unwrap();

    for (a, b) in [
        (&layout.root_background, &other.root_background),
        (&layout.tools_icon, &other.tools_icon),
        (&layout.og_font, &other.og_font),
    ] {
        assert_eq!(fs::read(a).unwrap(), fs::read(b).unwrap());
    }
    assert_eq!(
        fs::read(other.roms_root.join("Game Boy (GB)/.media/bg.png")).unwrap(),
        b"gb-bg"
    );
    assert_eq!(
        fs::read(other.overlays_root.join("GB/grid.png")).unwrap(),
        b"overlay"
    );
    let accents = fs::read_to_string(&other.accent_settings).unwrap();
    assert!(accents.contains("color1=#FF0000"));
}
