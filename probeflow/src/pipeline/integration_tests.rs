//! End-to-end builds of the GEO pipeline against local archives.

#[cfg(test)]
mod tests {
    use crate::cleanup::CLEANUP_MARKER_PAYLOAD;
    use crate::config::{PipelineConfig, CLEANUP_MARKER_NAME, TRIMMED_MARKER_NAME};
    use crate::context::{RunContext, RunIdentity};
    use crate::core::StageStatus;
    use crate::errors::PipelineError;
    use crate::events::CollectingEventSink;
    use crate::pipeline::{geo_pipeline, PipelineBuilder, CLEAN, DOWNLOAD, EXTRACT, TRIM};
    use crate::stages::{ExtractStage, TrimStage};
    use crate::testing::{
        assert_executed, assert_skipped, assert_stage_status, illumina_sample, test_config,
        ArchiveBuilder, RecordingStage, SectionFileBuilder,
    };
    use crate::trim::TRIMMED_MARKER_PAYLOAD;
    use pretty_assertions::assert_eq;
    use std::fs;
    use std::path::Path;
    use std::sync::Arc;
    use tempfile::TempDir;

    fn ctx(config: &PipelineConfig) -> RunContext {
        RunContext::new(RunIdentity::new(&config.dataset_id))
    }

    /// Places a two-sample archive where the download stage expects it, so
    /// that no build in these tests touches the network.
    fn seed_archive(config: &PipelineConfig) {
        ArchiveBuilder::new()
            .gzip_member("GSM1_sample_a.txt.gz", &illumina_sample("a"))
            .gzip_member("GSM2_sample_b.txt.gz", &illumina_sample("b"))
            .raw_member("GSM3_sample_c.idat", b"IDAT")
            .write(&config.archive_path())
            .unwrap();
    }

    fn file_names(dir: &Path) -> Vec<String> {
        let mut names: Vec<String> = fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    #[test]
    fn test_geo_pipeline_shape() {
        let config = PipelineConfig::default();
        let graph = geo_pipeline(&config).unwrap();

        assert_eq!(graph.execution_order(), &[DOWNLOAD, EXTRACT, TRIM, CLEAN]);
        let described = graph.describe();
        assert_eq!(described[2].dependencies, vec![EXTRACT.to_string()]);
        assert_eq!(described[3].output_targets, vec![config.cleanup_marker_path()]);
    }

    #[tokio::test]
    async fn test_build_trim_from_local_archive() {
        let dir = TempDir::new().unwrap();
        let config = test_config(dir.path());
        seed_archive(&config);

        let report = geo_pipeline(&config).unwrap().build(TRIM, &ctx(&config)).await.unwrap();

        assert_skipped(&report, &[DOWNLOAD]);
        assert_executed(&report, &[EXTRACT, TRIM]);
        assert_eq!(
            file_names(&config.trimmed_dir),
            vec![
                "GSM1_sample_a_trimmed_Probes.tsv",
                "GSM2_sample_b_trimmed_Probes.tsv",
                TRIMMED_MARKER_NAME,
            ]
        );
        let trimmed = fs::read_to_string(config.trimmed_dir.join("GSM1_sample_a_trimmed_Probes.tsv"))
            .unwrap();
        assert!(trimmed.starts_with("ID_REF\tSymbol\tChromosome\n"));
        assert_eq!(
            fs::read_to_string(config.trimmed_marker_path()).unwrap(),
            TRIMMED_MARKER_PAYLOAD
        );
        assert!(config
            .processed_dir
            .join("GSM1_sample_a.txt")
            .join("GSM1_sample_a_Controls.tsv")
            .is_file());
    }

    #[tokio::test]
    async fn test_heading_and_probes_scenario() {
        let dir = TempDir::new().unwrap();
        let config = test_config(dir.path());
        ArchiveBuilder::new()
            .gzip_member(
                "GSM9.txt.gz",
                "[Heading]\na\tb\n[Probes]\nID_REF\tDefinition\tProbe_Sequence\n1\tfoo\tACGT\n",
            )
            .write(&config.archive_path())
            .unwrap();

        geo_pipeline(&config).unwrap().build(TRIM, &ctx(&config)).await.unwrap();

        let member_dir = config.processed_dir.join("GSM9.txt");
        assert_eq!(
            fs::read_to_string(member_dir.join("GSM9_Heading.tsv")).unwrap(),
            "a\tb\n"
        );
        assert_eq!(
            fs::read_to_string(member_dir.join("GSM9_Probes.tsv")).unwrap(),
            "ID_REF\tDefinition\tProbe_Sequence\n1\tfoo\tACGT\n"
        );
        assert_eq!(
            fs::read_to_string(config.trimmed_dir.join("GSM9_trimmed_Probes.tsv")).unwrap(),
            "ID_REF\n1\n"
        );
    }

    #[tokio::test]
    async fn test_full_build_cleans_processed_data() {
        let dir = TempDir::new().unwrap();
        let config = test_config(dir.path());
        seed_archive(&config);

        let report = geo_pipeline(&config).unwrap().build(CLEAN, &ctx(&config)).await.unwrap();

        assert!(report.is_success());
        assert_executed(&report, &[EXTRACT, TRIM, CLEAN]);
        assert_eq!(file_names(&config.processed_dir), vec![CLEANUP_MARKER_NAME]);
        assert!(fs::read_to_string(config.cleanup_marker_path())
            .unwrap()
            .starts_with(CLEANUP_MARKER_PAYLOAD));
        assert!(config.archive_path().is_file());
        assert_eq!(file_names(&config.trimmed_dir).len(), 3);
    }

    #[tokio::test]
    async fn test_rebuild_is_a_no_op() {
        let dir = TempDir::new().unwrap();
        let config = test_config(dir.path());
        seed_archive(&config);
        let graph = geo_pipeline(&config).unwrap();
        graph.build(TRIM, &ctx(&config)).await.unwrap();
        let trimmed = config.trimmed_dir.join("GSM1_sample_a_trimmed_Probes.tsv");
        let before = fs::metadata(&trimmed).unwrap().modified().unwrap();

        let report = graph.build(TRIM, &ctx(&config)).await.unwrap();

        assert_skipped(&report, &[DOWNLOAD, EXTRACT, TRIM]);
        assert_eq!(fs::metadata(&trimmed).unwrap().modified().unwrap(), before);
    }

    #[tokio::test]
    async fn test_rebuild_after_cleanup_skips_everything() {
        let dir = TempDir::new().unwrap();
        let config = test_config(dir.path());
        seed_archive(&config);
        let graph = geo_pipeline(&config).unwrap();
        graph.build(CLEAN, &ctx(&config)).await.unwrap();

        let report = graph.build(CLEAN, &ctx(&config)).await.unwrap();

        assert_skipped(&report, &[DOWNLOAD, EXTRACT, TRIM, CLEAN]);
    }

    #[tokio::test]
    async fn test_missing_archive_fails_extract() {
        let dir = TempDir::new().unwrap();
        let config = test_config(dir.path());
        // Stands in for a download that "succeeded" without producing the archive.
        let download = Arc::new(RecordingStage::new(
            DOWNLOAD,
            vec![dir.path().join("download.done")],
        ));
        let graph = PipelineBuilder::new("missing-archive")
            .stage(DOWNLOAD, download, &[])
            .unwrap()
            .stage(EXTRACT, Arc::new(ExtractStage::new(&config)), &[DOWNLOAD])
            .unwrap()
            .stage(TRIM, Arc::new(TrimStage::new(&config)), &[EXTRACT])
            .unwrap()
            .build()
            .unwrap();

        let err = graph.build(TRIM, &ctx(&config)).await.unwrap_err();

        assert!(matches!(err.source.root(), PipelineError::MissingInput { .. }));
        assert_stage_status(&err.report, EXTRACT, StageStatus::Failed);
        assert!(err.report.stage(TRIM).is_none());
        assert!(!config.processed_dir.exists());
        assert!(!config.trimmed_dir.exists());
    }

    #[tokio::test]
    async fn test_no_probes_fails_trim_without_marker() {
        let dir = TempDir::new().unwrap();
        let config = test_config(dir.path());
        let controls_only = SectionFileBuilder::new()
            .section("Controls", &["ID_REF\tType", "c1\tNEGATIVE"])
            .build();
        ArchiveBuilder::new()
            .gzip_member("GSM1.txt.gz", &controls_only)
            .write(&config.archive_path())
            .unwrap();
        let sink = Arc::new(CollectingEventSink::new());
        let ctx = RunContext::with_event_sink(RunIdentity::new("GSE1"), sink.clone());

        let err = geo_pipeline(&config).unwrap().build(CLEAN, &ctx).await.unwrap_err();

        assert!(matches!(err.source.root(), PipelineError::NoInputFound { .. }));
        assert_stage_status(&err.report, EXTRACT, StageStatus::Done);
        assert_stage_status(&err.report, TRIM, StageStatus::Failed);
        assert!(!config.trimmed_marker_path().exists());
        assert!(!config.cleanup_marker_path().exists());
        let failed = sink.events_of_type("stage.failed");
        assert_eq!(failed.len(), 1);
        assert_eq!(failed[0].1.as_ref().unwrap()["kind"], "no_input_found");
        assert_eq!(sink.events_of_type("pipeline.failed").len(), 1);
    }

    #[tokio::test]
    async fn test_corrupt_archive_allows_clean_rerun() {
        let dir = TempDir::new().unwrap();
        let config = test_config(dir.path());
        fs::create_dir_all(&config.download_dir).unwrap();
        fs::write(config.archive_path(), vec![b'x'; 1024]).unwrap();
        let graph = geo_pipeline(&config).unwrap();

        let err = graph.build(EXTRACT, &ctx(&config)).await.unwrap_err();
        assert_stage_status(&err.report, EXTRACT, StageStatus::Failed);
        assert!(!config.processed_dir.exists());

        seed_archive(&config);
        let report = graph.build(EXTRACT, &ctx(&config)).await.unwrap();
        assert_executed(&report, &[EXTRACT]);
    }
}
