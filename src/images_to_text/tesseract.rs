use super::{EngineLauncher, OcrEngine, Recognition};
use crate::config::OcrConfig;
use crate::error::OcrError;
use crate::model::ImageInput;
use async_trait::async_trait;
use log::debug;
use std::path::PathBuf;
use std::process::Stdio;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

/// Launches a local Tesseract executable.
///
/// The three resource locations map onto the command line: `core_path` is the
/// executable, `lang_path` the tessdata directory and `worker_path` the
/// directory the process runs in.
pub struct TesseractLauncher {
    core_path: PathBuf,
    lang_path: Option<PathBuf>,
    worker_path: Option<PathBuf>,
    language: String,
}

impl TesseractLauncher {
    pub fn new(config: &OcrConfig) -> Self {
        TesseractLauncher {
            core_path: PathBuf::from(&config.core_path),
            lang_path: config.lang_path.as_ref().map(PathBuf::from),
            worker_path: config.worker_path.as_ref().map(PathBuf::from),
            language: config.language.clone(),
        }
    }
}

#[async_trait]
impl EngineLauncher for TesseractLauncher {
    async fn launch(&self) -> Result<Box<dyn OcrEngine>, OcrError> {
        for (label, dir) in [("language data", &self.lang_path), ("worker", &self.worker_path)] {
            if let Some(dir) = dir {
                let is_dir = tokio::fs::metadata(dir)
                    .await
                    .map(|meta| meta.is_dir())
                    .unwrap_or(false);
                if !is_dir {
                    return Err(OcrError::Launch(format!(
                        "{} directory {} does not exist",
                        label,
                        dir.display()
                    )));
                }
            }
        }

        // Probe the executable so a missing install fails here, not mid-request
        let output = Command::new(&self.core_path)
            .arg("--version")
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|e| {
                OcrError::Launch(format!(
                    "could not run {}: {}",
                    self.core_path.display(),
                    e
                ))
            })?;

        if !output.status.success() {
            return Err(OcrError::Launch(format!(
                "{} --version exited with {}",
                self.core_path.display(),
                output.status
            )));
        }

        // Older releases print the version banner on stderr
        let banner = if output.stdout.is_empty() {
            &output.stderr
        } else {
            &output.stdout
        };
        debug!(
            "Found {}",
            String::from_utf8_lossy(banner).lines().next().unwrap_or("tesseract")
        );

        Ok(Box::new(TesseractEngine {
            core_path: self.core_path.clone(),
            lang_path: self.lang_path.clone(),
            worker_path: self.worker_path.clone(),
            language: self.language.clone(),
        }))
    }
}

pub struct TesseractEngine {
    core_path: PathBuf,
    lang_path: Option<PathBuf>,
    worker_path: Option<PathBuf>,
    language: String,
}

impl TesseractEngine {
    fn recognition_args(&self) -> Vec<String> {
        let mut args = vec![
            "stdin".to_string(),
            "stdout".to_string(),
            "-l".to_string(),
            self.language.clone(),
        ];
        if let Some(lang_path) = &self.lang_path {
            args.push("--tessdata-dir".to_string());
            args.push(lang_path.display().to_string());
        }
        args
    }
}

#[async_trait]
impl OcrEngine for TesseractEngine {
    fn engine_name(&self) -> &str {
        "tesseract"
    }

    async fn recognize(&self, image: &ImageInput) -> Result<Recognition, OcrError> {
        let mut command = Command::new(&self.core_path);
        command
            .args(self.recognition_args())
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        if let Some(dir) = &self.worker_path {
            command.current_dir(dir);
        }

        let mut child = command
            .spawn()
            .map_err(|e| OcrError::Recognize(format!("failed to start tesseract: {}", e)))?;

        // Tesseract reads the whole image before writing anything, so feeding
        // stdin to completion first cannot deadlock on stdout.
        if let Some(mut stdin) = child.stdin.take() {
            stdin
                .write_all(image.data())
                .await
                .map_err(|e| OcrError::Recognize(format!("failed to send image: {}", e)))?;
        }

        let output = child
            .wait_with_output()
            .await
            .map_err(|e| OcrError::Recognize(format!("tesseract did not finish: {}", e)))?;

        if !output.status.success() {
            return Err(OcrError::Recognize(format!(
                "tesseract exited with {}: {}",
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        Ok(Recognition {
            text: String::from_utf8_lossy(&output.stdout).into_owned(),
            confidence: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> OcrConfig {
        OcrConfig::default()
    }

    #[tokio::test]
    async fn test_launch_missing_executable() {
        let launcher = TesseractLauncher::new(&OcrConfig {
            core_path: "/nonexistent/bin/tesseract".to_string(),
            ..config()
        });
        let result = launcher.launch().await;
        assert!(matches!(result, Err(OcrError::Launch(_))));
    }

    #[tokio::test]
    async fn test_launch_missing_language_dir() {
        let launcher = TesseractLauncher::new(&OcrConfig {
            lang_path: Some("/nonexistent/tessdata".to_string()),
            ..config()
        });
        match launcher.launch().await {
            Err(OcrError::Launch(msg)) => assert!(msg.contains("language data")),
            _ => panic!("expected launch error"),
        }
    }

    #[tokio::test]
    async fn test_launch_rejects_file_as_worker_dir() {
        let file = std::env::temp_dir().join("protein-scout-worker-not-a-dir");
        tokio::fs::write(&file, b"x").await.unwrap();

        let launcher = TesseractLauncher::new(&OcrConfig {
            worker_path: Some(file.display().to_string()),
            ..config()
        });
        let result = launcher.launch().await;
        tokio::fs::remove_file(&file).await.unwrap();

        match result {
            Err(OcrError::Launch(msg)) => assert!(msg.contains("worker")),
            _ => panic!("expected launch error"),
        }
    }

    #[tokio::test]
    async fn test_launch_accepts_existing_worker_dir() {
        // The directory check passes, so the failure comes from the missing executable
        let launcher = TesseractLauncher::new(&OcrConfig {
            core_path: "/nonexistent/bin/tesseract".to_string(),
            worker_path: Some(std::env::temp_dir().display().to_string()),
            ..config()
        });
        match launcher.launch().await {
            Err(OcrError::Launch(msg)) => assert!(msg.contains("could not run")),
            _ => panic!("expected launch error"),
        }
    }

    #[test]
    fn test_recognition_args() {
        let engine = TesseractEngine {
            core_path: PathBuf::from("tesseract"),
            lang_path: Some(PathBuf::from("/usr/share/tessdata")),
            worker_path: None,
            language: "eng".to_string(),
        };
        assert_eq!(
            engine.recognition_args(),
            vec!["stdin", "stdout", "-l", "eng", "--tessdata-dir", "/usr/share/tessdata"]
        );
    }

    #[test]
    fn test_recognition_args_without_lang_path() {
        let engine = TesseractEngine {
            core_path: PathBuf::from("tesseract"),
            lang_path: None,
            worker_path: None,
            language: "deu".to_string(),
        };
        assert_eq!(engine.recognition_args(), vec!["stdin", "stdout", "-l", "deu"]);
    }
}
