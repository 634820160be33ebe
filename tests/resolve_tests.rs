//! Loading projects from disk and resolving their variants.

use anyhow::{Context, Result, ensure};
use camino::Utf8PathBuf;
use komposit::config::load_project;
use komposit::domain::{ComponentAnalyzer, resolve_variant};
use komposit::error::KompositError;
use rstest::rstest;
use test_support::ProjectFixture;
use test_support::project::GENERATE_AND_BUILD;

#[rstest]
fn worked_example_resolves_nested_component() -> Result<()> {
    let project = ProjectFixture::worked_example(GENERATE_AND_BUILD)?;
    let config = load_project(project.root())?;
    let variant = resolve_variant(config.variant("V")?, &config.pool, &config.project_dir)?;

    let app_id = variant.find("app").context("app resolved")?;
    let math_id = variant.find("math").context("math resolved")?;
    let app = variant.get(app_id).context("app component")?;
    ensure!(!app.is_subcomponent);
    ensure!(app.subcomponents == vec![math_id]);
    ensure!(variant.get(math_id).is_some_and(|m| m.is_subcomponent));
    ensure!(app.root_dir == project.root().join("app"));

    let sources = ComponentAnalyzer::new(&variant, [app_id]).collect_sources();
    ensure!(
        sources
            == vec![
                project.root().join("app/main.c"),
                project.root().join("math/a.c"),
            ],
        "unexpected sources {sources:?}"
    );
    Ok(())
}

#[rstest]
fn glob_sources_expand_against_component_dir() -> Result<()> {
    let project = ProjectFixture::new()?;
    project.write(
        "komposit.yaml",
        "variants:\n  - name: V\n    bom: [lib]\n",
    )?;
    project.write(
        "lib/komposit.yaml",
        "components:\n  - name: lib\n    sources: ['src/*.c']\n    test_sources: ['test/*.cc']\n",
    )?;
    for file in ["lib/src/b.c", "lib/src/a.c", "lib/test/t.cc", "lib/src/skip.h"] {
        project.write(file, "")?;
    }
    let config = load_project(project.root())?;
    let variant = resolve_variant(config.variant("V")?, &config.pool, &config.project_dir)?;
    let analyzer = ComponentAnalyzer::for_variant(&variant);
    let lib = project.root().join("lib");
    ensure!(analyzer.collect_sources() == vec![lib.join("src/a.c"), lib.join("src/b.c")]);
    ensure!(analyzer.collect_test_sources() == vec![lib.join("test/t.cc")]);
    ensure!(analyzer.collect_include_directories() == vec![lib]);
    Ok(())
}

#[rstest]
fn subcomponent_must_be_in_bom() -> Result<()> {
    let project = ProjectFixture::worked_example("")?;
    project.write(
        "komposit.yaml",
        "variants:\n  - name: V\n    bom: [app]\n",
    )?;
    let config = load_project(project.root())?;
    let err = resolve_variant(config.variant("V")?, &config.pool, &config.project_dir)
        .err()
        .context("resolution should fail")?;
    ensure!(
        err.to_string()
            == "Component 'math' not found in variant 'V' (referenced as subcomponent of 'app').",
        "{err}"
    );
    Ok(())
}

#[rstest]
fn variant_without_bom_is_empty() -> Result<()> {
    let project = ProjectFixture::new()?;
    project.write("komposit.yaml", "variants:\n  - name: V\n")?;
    let config = load_project(project.root())?;
    let err = resolve_variant(config.variant("V")?, &config.pool, &config.project_dir)
        .err()
        .context("resolution should fail")?;
    ensure!(err == KompositError::EmptyVariant { variant: "V".into() });
    Ok(())
}

#[rstest]
fn component_without_file_is_rooted_at_project() -> Result<()> {
    let config = komposit::config::ProjectConfig::from_user_configs(
        Utf8PathBuf::from("/project"),
        vec![komposit::config::UserConfig::from_str_named(
            "components:\n  - name: app\n    sources: [main.c]\nvariants:\n  - name: V\n    bom: [app]\n",
            None,
        )?],
    )?;
    let variant = resolve_variant(config.variant("V")?, &config.pool, &config.project_dir)?;
    let app = variant.components().first().context("app")?;
    ensure!(app.root_dir == Utf8PathBuf::from("/project"));
    ensure!(app.sources == vec![Utf8PathBuf::from("/project/main.c")]);
    Ok(())
}
