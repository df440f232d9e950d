use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

static NONCE: AtomicUsize = AtomicUsize::new(0);

/// Scratch corpus directory, removed on drop.
pub struct TempCorpus {
    root: PathBuf,
}

impl TempCorpus {
    pub fn new(name: &str) -> Self {
        let mut root = std::env::temp_dir();
        root.push(format!(
            "quran-typeset-{}-{}-{}",
            name,
            std::process::id(),
            NONCE.fetch_add(1, Ordering::Relaxed)
        ));
        fs::create_dir_all(&root).expect("create temp corpus");
        Self { root }
    }

    pub fn path(&self) -> &Path {
        &self.root
    }

    pub fn write_meta(&self, rows: &[&str]) {
        let mut body = rows.join("\n");
        body.push('\n');
        fs::write(self.root.join("meta.txt"), body).expect("write meta.txt");
    }

    pub fn write_chapter(&self, number: usize, verses: &[&str]) {
        let mut body = verses.join("\n");
        body.push('\n');
        fs::write(self.root.join(format!("{:03}.txt", number)), body).expect("write chapter");
    }
}

impl Drop for TempCorpus {
    fn drop(&mut self) {
        let _ = fs::remove_dir_all(&self.root);
    }
}
