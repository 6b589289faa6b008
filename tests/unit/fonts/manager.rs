use super::*;

#[test]
fn empty_database_falls_back_to_builtin() {
    let fm = FontManager::builtin_only();
    let font = fm.get_font("Arial", 16.0, FontWeight::NORMAL);
    assert_eq!(font.resolution(), FontResolution::Builtin);
    assert!(font.is_builtin());
    assert!(font.font_bytes().is_none());
    assert_eq!(font.size(), 16.0);
}

#[test]
fn same_key_returns_same_handle() {
    let fm = FontManager::builtin_only();
    let a = fm.get_font("Arial", 20.0, FontWeight::BOLD);
    let b = fm.get_font("  arial ", 20.0, FontWeight(600));
    assert!(Arc::ptr_eq(&a, &b));
    assert_eq!(fm.cached_len(), 1);
}

#[test]
fn size_and_weight_are_part_of_the_key() {
    let fm = FontManager::builtin_only();
    let regular = fm.get_font("Arial", 20.0, FontWeight::NORMAL);
    let bold = fm.get_font("Arial", 20.0, FontWeight::BOLD);
    let bigger = fm.get_font("Arial", 24.0, FontWeight::NORMAL);
    assert!(!Arc::ptr_eq(&regular, &bold));
    assert!(!Arc::ptr_eq(&regular, &bigger));
    assert!(bold.bold());
    assert_eq!(fm.cached_len(), 3);
}

#[test]
fn key_normalizes_family_and_weight() {
    let k = FontKey::new(" Times New Roman", 12.5, FontWeight(650));
    assert_eq!(k.family(), "times new roman");
    assert_eq!(k.size(), 12.5);
    assert!(k.bold());
    assert_eq!(k, FontKey::new("TIMES NEW ROMAN", 12.5, FontWeight::BOLD));
}

#[test]
fn directory_without_fonts_is_ignored() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("readme.txt"), b"not a font").unwrap();
    let cfg = RenderConfig {
        font_dirs: vec![dir.path().to_path_buf(), dir.path().join("missing")],
        load_system_fonts: false,
        ..RenderConfig::default()
    };
    let fm = FontManager::new(&cfg);
    assert_eq!(fm.face_count(), 0);
    assert!(fm.get_font("Anything", 10.0, FontWeight::NORMAL).is_builtin());
}

#[test]
fn concurrent_first_use_yields_equivalent_fonts() {
    let fm = Arc::new(FontManager::builtin_only());
    let handles = (0..8)
        .map(|_| {
            let fm = Arc::clone(&fm);
            std::thread::spawn(move || fm.get_font("Verdana", 18.0, FontWeight::NORMAL))
        })
        .collect::<Vec<_>>();

    let fonts = handles
        .into_iter()
        .map(|h| h.join().unwrap())
        .collect::<Vec<_>>();
    assert!(fonts.iter().all(|f| f.resolution() == fonts[0].resolution()));
    assert_eq!(fm.cached_len(), 1);
}

fn fixture_manager() -> FontManager {
    let dir = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/data/fonts");
    FontManager::new(&RenderConfig {
        font_dirs: vec![dir],
        load_system_fonts: false,
        ..RenderConfig::default()
    })
}

#[test]
fn font_dir_face_resolves_exactly_by_family_and_weight() {
    let fm = fixture_manager();
    assert_eq!(fm.face_count(), 1);

    let font = fm.get_font("tuffy", 16.0, FontWeight::NORMAL);
    assert_eq!(font.resolution(), FontResolution::Exact);
    assert_eq!(font.family(), "Tuffy");
    assert!(font.font_bytes().is_some_and(|b| !b.is_empty()));
}

#[test]
fn missing_weight_falls_back_to_family_default() {
    let fm = fixture_manager();
    let font = fm.get_font("Tuffy", 16.0, FontWeight::BOLD);
    assert_eq!(font.resolution(), FontResolution::FamilyDefault);
    assert_eq!(font.family(), "Tuffy");
    assert!(font.bold());
}

#[test]
fn unknown_family_uses_a_platform_face() {
    let fm = fixture_manager();
    let font = fm.get_font("no such family", 14.0, FontWeight::NORMAL);
    assert_eq!(font.resolution(), FontResolution::PlatformFallback);
    assert_eq!(font.family(), "Tuffy");
    assert!(!font.is_builtin());
}
