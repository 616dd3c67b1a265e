use nikkari_manifest::{AddOutcome, ProjectManifest};
use pretty_assertions::assert_eq;
use std::fs;
use tempfile::TempDir;

#[test]
fn create_add_reload_keeps_order_and_groups() {
    let temp = TempDir::new().expect("tempdir");
    let path = temp.path().join("demo.cbp");

    let mut manifest = ProjectManifest::create(&path, "Demo").expect("create");
    manifest
        .add_member(temp.path().join("src").join("a.c"))
        .expect("add src/a.c");
    manifest
        .add_member(temp.path().join("main.c"))
        .expect("add main.c");

    let reloaded = ProjectManifest::load(&path).expect("reload");
    assert_eq!(reloaded.title(), "Demo");

    let members = reloaded.members();
    let listed: Vec<(&str, &str)> = members
        .iter()
        .map(|m| (m.path.as_str(), m.group.as_str()))
        .collect();
    assert_eq!(listed, vec![("src/a.c", "src"), ("main.c", "")]);
}

#[test]
fn adding_preserves_foreign_content_verbatim() {
    let temp = TempDir::new().expect("tempdir");
    let path = temp.path().join("legacy.cbp");
    fs::write(
        &path,
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes" ?>
<CodeBlocks_project_file>
	<FileVersion major="1" minor="6" />
	<Project>
		<Option title="Legacy" />
		<Option compiler="gcc" />
		<Unit filename="main.c">
			<Option compilerVar="CC" />
		</Unit>
		<Unit filename="util/str.c" />
	</Project>
</CodeBlocks_project_file>
"#,
    )
    .expect("write legacy manifest");

    let mut manifest = ProjectManifest::load(&path).expect("load");
    let outcome = manifest.add_relative_member("util/str.h").expect("add");
    assert_eq!(outcome, AddOutcome::Added("util/str.h".to_string()));

    let raw = fs::read_to_string(&path).expect("read back");
    assert!(raw.contains("<FileVersion major=\"1\" minor=\"6\" />"));
    assert!(raw.contains("<Option compiler=\"gcc\" />"));
    assert!(raw.contains("<Option compilerVar=\"CC\" />"));

    let reloaded = ProjectManifest::load(&path).expect("reload");
    let paths: Vec<String> = reloaded.members().into_iter().map(|m| m.path).collect();
    assert_eq!(paths, vec!["main.c", "util/str.c", "util/str.h"]);
    assert_eq!(reloaded.title(), "Legacy");
}

#[test]
fn saving_twice_is_byte_identical() {
    let temp = TempDir::new().expect("tempdir");
    let path = temp.path().join("demo.cbp");
    let mut manifest = ProjectManifest::create(&path, "Demo").expect("create");
    manifest.add_relative_member("a.c").expect("add");
    let first = fs::read_to_string(&path).expect("read");

    ProjectManifest::load(&path)
        .expect("reload")
        .save()
        .expect("save");
    let second = fs::read_to_string(&path).expect("read");
    assert_eq!(first, second);
}
