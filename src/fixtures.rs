#[cfg(test)]
pub mod test {
    use crate::definitions::{DefinitionsFile, Deployment};
    use crate::terragrunt::IncludeConfig;

    /// One global include and one deployment with a local include.
    pub const SIMPLE_TERRAGRUNT: &str = include_str!("../testdata/simple_terragrunt.hcl");

    /// What `SIMPLE_TERRAGRUNT` generates at `path/to/test/terragrunt.hcl`.
    pub const SIMPLE_TERRAGRUNT_OUTPUT: &str = r#"
terraform {
  source = "mymodule"
}

include "all" {
  path = "world"
}
include "something" {
  path = "hello"
}
"#;

    pub const SIMPLE_DESTINATION: &str = "path/to/test/terragrunt.hcl";

    pub fn simple_definitions() -> DefinitionsFile {
        DefinitionsFile {
            deployments: vec![Deployment {
                name: "test".into(),
                source: "mymodule".into(),
                destination_path: SIMPLE_DESTINATION.into(),
                includes: vec![IncludeConfig::new("something", "hello")],
                dependencies: vec![],
            }],
            global_includes: vec![IncludeConfig::new("all", "world")],
            global_dependencies: vec![],
        }
    }

    /// `count` deployments, each with its own source and local include.
    pub fn numbered_definitions(root: &str, count: usize) -> DefinitionsFile {
        DefinitionsFile {
            deployments: (1..=count)
                .map(|i| Deployment {
                    name: format!("d{i}"),
                    source: format!("module-{i}"),
                    destination_path: format!("{root}/d{i}/terragrunt.hcl"),
                    includes: vec![IncludeConfig::new(format!("local-{i}"), format!("p{i}"))],
                    dependencies: vec![],
                })
                .collect(),
            global_includes: vec![IncludeConfig::new("all", "world")],
            global_dependencies: vec![],
        }
    }

    #[test]
    fn simple_fixture_decodes() {
        let decoded: DefinitionsFile = SIMPLE_TERRAGRUNT.parse().unwrap();
        assert_eq!(decoded, simple_definitions());
    }
}
