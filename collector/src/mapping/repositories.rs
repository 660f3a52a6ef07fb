use super::{
    PointMapper,
    HOST_TAG,
    REPOSITORIES_MEASUREMENT,
};
use crate::{
    point::Point,
    veeam::models::{
        Repositories,
        RepositoryConfig,
        RepositoryState,
    },
};

/// Repository types whose capacity view carries a local path and sizes.
pub const KNOWN_REPOSITORY_TYPES: [&str; 3] = ["WinLocal", "Nfs", "Smb"];

const BYTES_PER_GB: f64 = 1024.0 * 1024.0 * 1024.0;

pub fn gb_to_bytes(gb: f64) -> f64 {
    gb * BYTES_PER_GB
}

fn trim_path(path: &str) -> &str {
    path.trim_end_matches(|c| c == '\\' || c == '/')
}

impl PointMapper {
    /// One point per configured repository that has a capacity view with the
    /// same id and a known type.
    pub fn repositories(&self, repositories: &Repositories) -> Vec<Point> {
        let mut points = Vec::new();

        for config in &repositories.configs {
            let Some(state) = repositories.states.iter().find(|state| state.id == config.id) else {
                debug!(repository = %config.name, id = %config.id, "Skipping repository without capacity information");
                continue;
            };

            if !KNOWN_REPOSITORY_TYPES.contains(&state.kind.as_str()) {
                warn!(repository = %state.name, kind = %state.kind, "Unknown repository type");
                continue;
            }

            points.push(self.repository(config, state));
        }

        points
    }

    fn repository(&self, config: &RepositoryConfig, state: &RepositoryState) -> Point {
        Point::new(REPOSITORIES_MEASUREMENT)
            .tag(HOST_TAG, &self.host)
            .tag("veeamVBRRepoName", &state.name)
            .tag("veeamVBRRepoType", &state.kind)
            .tag("veeamVBRMSDescription", state.description.as_deref().unwrap_or_default())
            .tag("veeamVBRRepopath", trim_path(&state.path))
            .tag(
                "veeamVBRRepoPerVM",
                config.repository.advanced_settings.per_vm_backup.to_string(),
            )
            .field("veeamVBRRepoMaxtasks", config.repository.max_task_count)
            .field("veeamVBRRepoCapacity", gb_to_bytes(state.capacity_gb))
            .field("veeamVBRRepoFree", gb_to_bytes(state.free_gb))
            .field("veeamVBRRepoUsed", gb_to_bytes(state.used_space_gb))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{
        mapping::test::mapper,
        point::FieldValue,
        veeam::models::{
            AdvancedSettings,
            RepositorySettings,
        },
    };
    use pretty_assertions::assert_eq;

    fn config(id: &str, max_task_count: i64) -> RepositoryConfig {
        RepositoryConfig {
            id: id.to_string(),
            name: format!("repo-{id}"),
            repository: RepositorySettings {
                max_task_count,
                advanced_settings: AdvancedSettings { per_vm_backup: true },
            },
        }
    }

    fn state(id: &str, kind: &str) -> RepositoryState {
        RepositoryState {
            id: id.to_string(),
            name: format!("repo-{id}"),
            kind: kind.to_string(),
            description: Some("Created by Veeam".to_string()),
            path: "D:\\Backups\\".to_string(),
            capacity_gb: 100.0,
            free_gb: 25.5,
            used_space_gb: 74.5,
        }
    }

    #[test]
    fn joined_repository_is_converted_to_bytes() {
        let repositories = Repositories {
            configs: vec![config("r1", 4)],
            states: vec![state("r1", "WinLocal")],
        };

        let points = mapper().repositories(&repositories);
        assert_eq!(points.len(), 1);
        let point = &points[0];
        assert_eq!(point.measurement, "veeam_vbr_repositories");
        assert_eq!(point.timestamp, None);
        assert_eq!(point.tag_value("veeamVBRRepopath"), Some("D:\\Backups"));
        assert_eq!(point.tag_value("veeamVBRRepoPerVM"), Some("true"));
        assert_eq!(point.tag_value("veeamVBRMSDescription"), Some("Created by Veeam"));
        assert_eq!(point.field_value("veeamVBRRepoMaxtasks"), Some(&FieldValue::Integer(4)));
        assert_eq!(
            point.field_value("veeamVBRRepoCapacity"),
            Some(&FieldValue::Float(107_374_182_400.0))
        );
        assert_eq!(
            point.field_value("veeamVBRRepoFree"),
            Some(&FieldValue::Float(25.5 * 1_073_741_824.0))
        );
        assert_eq!(
            point.field_value("veeamVBRRepoUsed"),
            Some(&FieldValue::Float(74.5 * 1_073_741_824.0))
        );
    }

    #[test]
    fn configuration_without_capacity_view_is_skipped() {
        let repositories = Repositories {
            configs: vec![config("r1", 4)],
            states: vec![state("r2", "WinLocal")],
        };
        assert!(mapper().repositories(&repositories).is_empty());
    }

    #[test]
    fn capacity_view_without_configuration_is_skipped() {
        let repositories = Repositories {
            configs: vec![config("r1", 4)],
            states: vec![state("r1", "Nfs"), state("r9", "Smb")],
        };
        let points = mapper().repositories(&repositories);
        assert_eq!(points.len(), 1);
        assert_eq!(points[0].tag_value("veeamVBRRepoName"), Some("repo-r1"));
    }

    #[test]
    fn unknown_types_are_skipped_without_error() {
        let repositories = Repositories {
            configs: vec![config("r1", 4), config("r2", 2)],
            states: vec![state("r1", "AmazonS3"), state("r2", "Smb")],
        };
        let points = mapper().repositories(&repositories);
        assert_eq!(points.len(), 1);
        assert_eq!(points[0].tag_value("veeamVBRRepoType"), Some("Smb"));
    }

    #[test]
    fn trailing_separators_are_stripped() {
        assert_eq!(trim_path("D:\\Backups\\\\"), "D:\\Backups");
        assert_eq!(trim_path("/mnt/backups/"), "/mnt/backups");
        assert_eq!(trim_path("nas:/export"), "nas:/export");
    }
}
