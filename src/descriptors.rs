//! Reads and writes the descriptor file shared by `introspect` and `harvest`

use anyhow::Context;
use camino::Utf8Path;
use harvest_client::QueryDescriptor;
use harvest_std::{Fs, HarvestStdError};

use crate::{HarvestError, HarvestResult, Suggestion};

/// Loads the descriptors in file order. `null` entries, which older files
/// carry for queries that could not be described, are dropped.
pub fn load(path: &Utf8Path) -> HarvestResult<Vec<QueryDescriptor>> {
    let contents = Fs::read_file(path).map_err(|err| match err {
        HarvestStdError::EmptyFile { .. } => HarvestError::new(err),
        _ => HarvestError::new(err).with_suggestion(Suggestion::RunIntrospectFirst),
    })?;
    let descriptors = parse(&contents)
        .with_context(|| format!("could not parse descriptors in {path}"))?;
    tracing::debug!(%path, count = descriptors.len(), "loaded descriptors");
    Ok(descriptors)
}

pub fn parse(contents: &str) -> serde_json::Result<Vec<QueryDescriptor>> {
    let entries: Vec<Option<QueryDescriptor>> = serde_json::from_str(contents)?;
    Ok(entries.into_iter().flatten().collect())
}

/// Writes `descriptors` as a 2-space indented JSON array, creating the parent
/// directory if needed
pub fn save(path: &Utf8Path, descriptors: &[QueryDescriptor]) -> HarvestResult<()> {
    let contents = serde_json::to_string_pretty(descriptors)?;
    Fs::write_file(path, contents)?;
    tracing::debug!(%path, count = descriptors.len(), "saved descriptors");
    Ok(())
}

#[cfg(test)]
mod tests {
    use assert_fs::{prelude::*, TempDir};
    use camino::Utf8PathBuf;
    use harvest_client::{QueryDescriptor, TypeKind, TypeRef};
    use indoc::indoc;
    use pretty_assertions::assert_eq;
    use speculoos::prelude::*;

    use super::{load, parse, save};
    use crate::Suggestion;

    #[test]
    fn it_drops_null_entries() {
        let descriptors = parse(indoc! {r#"
            [
              null,
              {
                "name": "metadata",
                "description": null,
                "args": [],
                "returnType": { "kind": "OBJECT", "name": "Metadata", "ofType": null },
                "fields": [
                  { "name": "serverQueryCacheLastUpdated", "type": { "kind": "SCALAR", "name": "String", "ofType": null } }
                ]
              }
            ]
        "#})
        .unwrap();

        assert_eq!(descriptors.len(), 1);
        assert_eq!(descriptors[0].name, "metadata");
    }

    #[test]
    fn it_saves_what_it_loads() {
        let temp = TempDir::new().unwrap();
        let path = Utf8PathBuf::from_path_buf(temp.path().join("_metadata/queries.json")).unwrap();
        let descriptors = vec![QueryDescriptor {
            name: "naicsIndustryList".to_string(),
            description: Some("All industries".to_string()),
            args: Vec::new(),
            return_type: TypeRef::wrapping(TypeKind::List, TypeRef::named(TypeKind::Object, "NaicsIndustry")),
            fields: Vec::new(),
        }];

        save(&path, &descriptors).unwrap();

        temp.child("_metadata/queries.json")
            .assert(predicates::str::starts_with("[\n  {\n    \"name\": \"naicsIndustryList\""));
        assert_eq!(load(&path).unwrap(), descriptors);
    }

    #[test]
    fn it_suggests_introspecting_when_the_file_is_missing() {
        let temp = TempDir::new().unwrap();
        let path = Utf8PathBuf::from_path_buf(temp.path().join("missing.json")).unwrap();

        let err = load(&path).unwrap_err();

        assert_that!(err.suggestion()).is_equal_to(Some(Suggestion::RunIntrospectFirst));
    }

    #[test]
    fn it_rejects_malformed_files() {
        let temp = TempDir::new().unwrap();
        temp.child("bad.json").write_str("{\"name\": \"metadata\"}").unwrap();
        let path = Utf8PathBuf::from_path_buf(temp.path().join("bad.json")).unwrap();

        let err = load(&path).unwrap_err();

        assert_that!(err.message()).contains("could not parse descriptors");
    }
}
