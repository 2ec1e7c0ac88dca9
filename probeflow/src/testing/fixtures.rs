//! Fixtures for building synthetic pipeline inputs.

use crate::config::PipelineConfig;
use flate2::write::GzEncoder;
use flate2::Compression;
use std::fs::{self, File};
use std::io::{self, Read, Write};
use std::net::TcpListener;
use std::path::{Path, PathBuf};

/// Builds section-delimited text, one `[key]` line per section.
#[derive(Debug, Clone, Default)]
pub struct SectionFileBuilder {
    text: String,
}

impl SectionFileBuilder {
    /// Creates an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a raw line outside of any section.
    #[must_use]
    pub fn line(mut self, line: &str) -> Self {
        self.text.push_str(line);
        self.text.push('\n');
        self
    }

    /// Appends a section with the given lines.
    #[must_use]
    pub fn section<S: AsRef<str>>(mut self, key: &str, lines: &[S]) -> Self {
        self.text.push_str(&format!("[{key}]\n"));
        for line in lines {
            self.text.push_str(line.as_ref());
            self.text.push('\n');
        }
        self
    }

    /// Returns the built text.
    #[must_use]
    pub fn build(&self) -> String {
        self.text.clone()
    }

    /// Writes the text to `dir/name` and returns the path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn write(&self, dir: &Path, name: &str) -> io::Result<PathBuf> {
        fs::create_dir_all(dir)?;
        let path = dir.join(name);
        fs::write(&path, &self.text)?;
        Ok(path)
    }
}

/// A typical per-sample expression file with `Heading`, `Probes` and
/// `Controls` sections. The `Probes` section carries two of the annotation
/// columns the trimmer removes.
#[must_use]
pub fn illumina_sample(sample: &str) -> String {
    SectionFileBuilder::new()
        .section(
            "Heading",
            &[
                "Illumina Inc. GenomeStudio version\t1.9.0".to_string(),
                format!("Sample\t{sample}"),
            ],
        )
        .section(
            "Probes",
            &[
                "ID_REF\tSymbol\tDefinition\tProbe_Sequence\tChromosome",
                "ILMN_1343291\tEEF1A1\teukaryotic translation elongation factor\tTGTGTTGAGAGCTTCTCAGACTATCCACCTTTGGGTCGCTTTGCTGTTCG\t6",
                "ILMN_1343295\tGAPDH\tglyceraldehyde-3-phosphate dehydrogenase\tCTTCAACAGCGACACCCACTCCTCCACCTTTGACGCTGGGGCTGGCATTG\t12",
            ],
        )
        .section("Controls", &["ID_REF\tType", "ILMN_2038768\tNEGATIVE"])
        .build()
}

#[derive(Debug, Clone)]
enum Member {
    Gzip(String),
    Raw(Vec<u8>),
}

/// Builds an uncompressed tar archive in the layout of a GEO `_RAW.tar`.
#[derive(Debug, Clone, Default)]
pub struct ArchiveBuilder {
    members: Vec<(String, Member)>,
}

impl ArchiveBuilder {
    /// Creates an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a member holding `text` gzip-compressed.
    #[must_use]
    pub fn gzip_member(mut self, name: &str, text: &str) -> Self {
        self.members.push((name.to_string(), Member::Gzip(text.to_string())));
        self
    }

    /// Adds a member holding `bytes` as-is.
    #[must_use]
    pub fn raw_member(mut self, name: &str, bytes: &[u8]) -> Self {
        self.members.push((name.to_string(), Member::Raw(bytes.to_vec())));
        self
    }

    /// Writes the archive to `path` and returns it.
    ///
    /// # Errors
    ///
    /// Returns an error if compression or writing fails.
    pub fn write(&self, path: &Path) -> io::Result<PathBuf> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut builder = tar::Builder::new(File::create(path)?);

        for (name, member) in &self.members {
            let bytes = match member {
                Member::Gzip(text) => {
                    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
                    encoder.write_all(text.as_bytes())?;
                    encoder.finish()?
                }
                Member::Raw(bytes) => bytes.clone(),
            };
            let mut header = tar::Header::new_gnu();
            header.set_size(bytes.len() as u64);
            header.set_mode(0o644);
            header.set_entry_type(tar::EntryType::Regular);
            builder.append_data(&mut header, name, bytes.as_slice())?;
        }

        builder.into_inner()?.sync_all()?;
        Ok(path.to_path_buf())
    }
}

/// A configuration whose directories all live under `root`.
#[must_use]
pub fn test_config(root: &Path) -> PipelineConfig {
    PipelineConfig::new()
        .with_dataset_id("GSE1")
        .with_download_dir(root.join("data"))
        .with_processed_dir(root.join("processed_data"))
        .with_trimmed_dir(root.join("trimmed_probes"))
}

/// Serves exactly one HTTP response on a local port, whatever the request
/// path, and returns the server's base URL.
///
/// # Errors
///
/// Returns an error if no local port can be bound.
pub fn serve_once(status: &'static str, body: Vec<u8>) -> io::Result<String> {
    let listener = TcpListener::bind("127.0.0.1:0")?;
    let addr = listener.local_addr()?;
    std::thread::spawn(move || -> io::Result<()> {
        let (mut stream, _) = listener.accept()?;
        let mut request = Vec::new();
        let mut buf = [0_u8; 1024];
        while !request.windows(4).any(|w| w == b"\r\n\r\n") {
            let n = stream.read(&mut buf)?;
            if n == 0 {
                break;
            }
            request.extend_from_slice(&buf[..n]);
        }
        let head = format!(
            "HTTP/1.1 {status}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
            body.len()
        );
        stream.write_all(head.as_bytes())?;
        stream.write_all(&body)
    });
    Ok(format!("http://{addr}"))
}
