//! 임시/영구 디렉토리 사이의 파일 이동.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use refund_core::UploadConfig;
use tokio::fs;
use tokio::io::AsyncWriteExt;

/// 파일 위치.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Location {
    /// 업로드 직후의 임시 디렉토리
    Tmp,
    /// 검증을 통과한 파일의 영구 디렉토리
    Upload,
}

impl std::fmt::Display for Location {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Location::Tmp => write!(f, "tmp"),
            Location::Upload => write!(f, "upload"),
        }
    }
}

/// 저장소 에러.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Arquivo não encontrado: {}", .0.display())]
    NotFound(PathBuf),
    #[error("Nome de arquivo inválido: {0}")]
    InvalidName(String),
    #[error("Falha de E/S no armazenamento: {0}")]
    Io(#[from] std::io::Error),
}

/// 파일 스테이저.
///
/// 파일 이름은 요청마다 무작위 접두어로 생성되므로 요청 간 충돌이 없고
/// 별도의 잠금이 필요하지 않습니다.
#[derive(Debug, Clone)]
pub struct FileStager {
    tmp_dir: PathBuf,
    uploads_dir: PathBuf,
}

impl FileStager {
    /// 새 스테이저 생성.
    pub fn new(tmp_dir: impl Into<PathBuf>, uploads_dir: impl Into<PathBuf>) -> Self {
        Self {
            tmp_dir: tmp_dir.into(),
            uploads_dir: uploads_dir.into(),
        }
    }

    /// 업로드 설정에서 생성.
    pub fn from_config(config: &UploadConfig) -> Self {
        Self::new(&config.tmp_folder, &config.uploads_folder)
    }

    /// 위치별 디렉토리.
    pub fn dir(&self, location: Location) -> &Path {
        match location {
            Location::Tmp => &self.tmp_dir,
            Location::Upload => &self.uploads_dir,
        }
    }

    /// 파일 경로 계산. 디렉토리를 벗어나는 이름은 거부합니다.
    pub fn path(&self, filename: &str, location: Location) -> Result<PathBuf, StorageError> {
        validate_name(filename)?;
        Ok(self.dir(location).join(filename))
    }

    /// 업로드 파일 이름 생성.
    ///
    /// 20자리 16진수 무작위 접두어 + `-` + 원본 파일 이름(경로 제거).
    pub fn generate_name(original_name: &str) -> String {
        let prefix = hex::encode(rand::random::<[u8; 10]>());
        let base = sanitize_original_name(original_name);

        if base.is_empty() {
            prefix
        } else {
            format!("{prefix}-{base}")
        }
    }

    /// 임시 디렉토리에 새 파일을 열어 스트리밍 쓰기를 시작합니다.
    pub async fn stage(&self, original_name: &str) -> Result<StagedFile, StorageError> {
        fs::create_dir_all(&self.tmp_dir).await?;

        let filename = Self::generate_name(original_name);
        let path = self.path(&filename, Location::Tmp)?;
        let file = fs::File::create(&path).await?;

        tracing::debug!(filename = %filename, "Staged upload in tmp");

        Ok(StagedFile {
            filename,
            file,
            size: 0,
            guard: TmpGuard { path, armed: true },
        })
    }

    /// 스테이징이 끝난 업로드를 영구 디렉토리로 이동하고 정리 가드를 해제합니다.
    ///
    /// 이동에 실패하면 가드가 drop되면서 임시 파일이 삭제됩니다.
    pub async fn persist_staged(&self, mut staged: StagedUpload) -> Result<String, StorageError> {
        let filename = self.persist(&staged.filename).await?;
        staged.guard.disarm();
        Ok(filename)
    }

    /// 임시 파일을 영구 디렉토리로 이동.
    ///
    /// 임시 파일이 없으면 파일 시스템을 건드리지 않고 `NotFound`를 반환합니다.
    /// 이동(rename)이 실패하면 파일은 임시 디렉토리에 남습니다.
    pub async fn persist(&self, filename: &str) -> Result<String, StorageError> {
        let tmp_path = self.path(filename, Location::Tmp)?;
        let dest_path = self.path(filename, Location::Upload)?;

        match fs::metadata(&tmp_path).await {
            Ok(meta) if meta.is_file() => {}
            Ok(_) => return Err(StorageError::NotFound(tmp_path)),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(StorageError::NotFound(tmp_path))
            }
            Err(e) => return Err(e.into()),
        }

        fs::create_dir_all(&self.uploads_dir).await?;
        fs::rename(&tmp_path, &dest_path).await?;

        tracing::info!(filename = %filename, "Upload persisted");
        Ok(filename.to_string())
    }

    /// 파일 삭제. 파일이 없어도 성공합니다.
    pub async fn discard(&self, filename: &str, location: Location) -> Result<(), StorageError> {
        let path = self.path(filename, location)?;

        match fs::remove_file(&path).await {
            Ok(()) => {
                tracing::debug!(filename = %filename, %location, "Upload discarded");
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    /// 파일이 해당 위치에 있는지 확인.
    pub async fn exists(&self, filename: &str, location: Location) -> Result<bool, StorageError> {
        let path = self.path(filename, location)?;
        match fs::metadata(&path).await {
            Ok(meta) => Ok(meta.is_file()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }
}

/// 임시 파일 정리 가드.
///
/// 해제되지 않은 채 drop되면 임시 파일을 삭제합니다. 스트림 에러뿐 아니라
/// 타임아웃이나 연결 종료로 핸들러 future가 버려질 때도 동작합니다.
#[derive(Debug)]
struct TmpGuard {
    path: PathBuf,
    armed: bool,
}

impl TmpGuard {
    fn disarm(&mut self) {
        self.armed = false;
    }
}

impl Drop for TmpGuard {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }

        // Drop에서는 await할 수 없으므로 동기 삭제
        match std::fs::remove_file(&self.path) {
            Ok(()) => {
                tracing::debug!(path = %self.path.display(), "Abandoned upload removed from tmp");
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => {
                tracing::warn!(
                    path = %self.path.display(),
                    error = %e,
                    "Failed to remove abandoned upload from tmp"
                );
            }
        }
    }
}

/// 임시 디렉토리에 기록 중인 파일.
///
/// [`finish`](Self::finish) 전에 drop되면 부분 파일이 삭제됩니다.
#[derive(Debug)]
pub struct StagedFile {
    filename: String,
    file: fs::File,
    size: u64,
    guard: TmpGuard,
}

impl StagedFile {
    /// 생성된 파일 이름.
    pub fn filename(&self) -> &str {
        &self.filename
    }

    /// 지금까지 기록된 바이트 수.
    pub fn size(&self) -> u64 {
        self.size
    }

    pub fn path(&self) -> &Path {
        &self.guard.path
    }

    /// 청크 추가.
    pub async fn write_chunk(&mut self, chunk: &[u8]) -> Result<(), StorageError> {
        self.file.write_all(chunk).await?;
        self.size += chunk.len() as u64;
        Ok(())
    }

    /// 쓰기 완료.
    ///
    /// 반환된 [`StagedUpload`]도 영구 디렉토리로 옮겨지기 전에 drop되면
    /// 임시 파일을 삭제합니다.
    pub async fn finish(mut self) -> Result<StagedUpload, StorageError> {
        self.file.flush().await?;
        self.file.sync_all().await?;

        let StagedFile {
            filename,
            file,
            size,
            guard,
        } = self;
        drop(file);

        Ok(StagedUpload {
            filename,
            size,
            guard,
        })
    }
}

/// 기록이 끝나 검증을 기다리는 임시 파일.
#[derive(Debug)]
pub struct StagedUpload {
    filename: String,
    size: u64,
    guard: TmpGuard,
}

impl StagedUpload {
    pub fn filename(&self) -> &str {
        &self.filename
    }

    pub fn size(&self) -> u64 {
        self.size
    }

    pub fn path(&self) -> &Path {
        &self.guard.path
    }
}

fn validate_name(filename: &str) -> Result<(), StorageError> {
    let invalid = filename.is_empty()
        || filename == "."
        || filename == ".."
        || filename.contains(['/', '\\', '\0']);

    if invalid {
        Err(StorageError::InvalidName(filename.to_string()))
    } else {
        Ok(())
    }
}

/// 원본 이름 최대 길이 (바이트). 접두어 21바이트와 합쳐 NAME_MAX(255) 이하.
const MAX_BASE_NAME_BYTES: usize = 200;

/// 잘라낼 때 보존하는 확장자 최대 길이 (점 포함).
const MAX_EXTENSION_BYTES: usize = 16;

fn truncate_base_name(name: &str) -> String {
    if name.len() <= MAX_BASE_NAME_BYTES {
        return name.to_string();
    }

    let (stem, extension) = match name.rfind('.') {
        Some(i) if i > 0 && name.len() - i <= MAX_EXTENSION_BYTES => name.split_at(i),
        _ => (name, ""),
    };

    let mut end = (MAX_BASE_NAME_BYTES - extension.len()).min(stem.len());
    while !stem.is_char_boundary(end) {
        end -= 1;
    }

    format!("{}{}", &stem[..end], extension)
}

fn sanitize_original_name(original_name: &str) -> String {
    let base = original_name
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default()
        .trim();

    if base == "." || base == ".." {
        return String::new();
    }

    let cleaned: String = base
        .chars()
        .map(|c| if c.is_control() { '_' } else { c })
        .collect();

    truncate_base_name(&cleaned)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stager(dir: &Path) -> FileStager {
        FileStager::new(dir.join("tmp"), dir.join("tmp").join("uploads"))
    }

    async fn write_tmp(stager: &FileStager, name: &str, bytes: &[u8]) {
        fs::create_dir_all(stager.dir(Location::Tmp)).await.unwrap();
        fs::write(stager.dir(Location::Tmp).join(name), bytes)
            .await
            .unwrap();
    }

    #[test]
    fn test_generate_name() {
        let name = FileStager::generate_name("recibo.png");
        let (prefix, rest) = name.split_at(20);

        assert!(prefix.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
        assert_eq!(rest, "-recibo.png");
        assert_ne!(name, FileStager::generate_name("recibo.png"));
    }

    #[test]
    fn test_generate_name_strips_path() {
        let name = FileStager::generate_name("../../etc/passwd");
        assert!(name.ends_with("-passwd"));

        let name = FileStager::generate_name("C:\\Users\\ana\\nota.jpg");
        assert!(name.ends_with("-nota.jpg"));

        let name = FileStager::generate_name("..");
        assert_eq!(name.len(), 20);
    }

    #[test]
    fn test_path_rejects_traversal() {
        let stager = FileStager::new("tmp", "tmp/uploads");
        for name in ["", ".", "..", "../x.png", "a/b.png", "a\\b.png"] {
            assert!(
                matches!(stager.path(name, Location::Tmp), Err(StorageError::InvalidName(_))),
                "{name:?}"
            );
        }
        assert!(stager.path("abc-recibo.png", Location::Upload).is_ok());
    }

    #[tokio::test]
    async fn test_persist_moves_file() {
        let dir = tempfile::tempdir().unwrap();
        let stager = stager(dir.path());
        write_tmp(&stager, "abc-recibo.png", b"png").await;

        let result = stager.persist("abc-recibo.png").await.unwrap();
        assert_eq!(result, "abc-recibo.png");

        assert!(!stager.exists("abc-recibo.png", Location::Tmp).await.unwrap());
        assert!(stager.exists("abc-recibo.png", Location::Upload).await.unwrap());

        let content = fs::read(stager.dir(Location::Upload).join("abc-recibo.png"))
            .await
            .unwrap();
        assert_eq!(content, b"png");
    }

    #[tokio::test]
    async fn test_persist_missing_file_has_no_side_effects() {
        let dir = tempfile::tempdir().unwrap();
        let stager = stager(dir.path());

        let result = stager.persist("missing.png").await;
        assert!(matches!(result, Err(StorageError::NotFound(_))));

        // 영구 디렉토리도 만들어지지 않아야 함
        assert!(!stager.dir(Location::Upload).exists());
        assert!(!stager.dir(Location::Tmp).exists());
    }

    #[tokio::test]
    async fn test_discard_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let stager = stager(dir.path());
        write_tmp(&stager, "abc-recibo.png", b"png").await;

        stager.discard("abc-recibo.png", Location::Tmp).await.unwrap();
        assert!(!stager.exists("abc-recibo.png", Location::Tmp).await.unwrap());

        stager.discard("abc-recibo.png", Location::Tmp).await.unwrap();
        stager.discard("never-existed.png", Location::Upload).await.unwrap();
    }

    #[tokio::test]
    async fn test_stage_streams_chunks() {
        let dir = tempfile::tempdir().unwrap();
        let stager = stager(dir.path());

        let mut staged = stager.stage("nota.jpg").await.unwrap();
        staged.write_chunk(b"hello ").await.unwrap();
        staged.write_chunk(b"world").await.unwrap();
        assert_eq!(staged.size(), 11);

        let upload = staged.finish().await.unwrap();
        assert_eq!(upload.size(), 11);
        assert!(upload.filename().ends_with("-nota.jpg"));
        assert!(stager.exists(upload.filename(), Location::Tmp).await.unwrap());

        let filename = stager.persist_staged(upload).await.unwrap();
        assert!(!stager.exists(&filename, Location::Tmp).await.unwrap());
        assert!(stager.exists(&filename, Location::Upload).await.unwrap());
    }

    #[tokio::test]
    async fn test_dropped_stage_removes_partial_file() {
        let dir = tempfile::tempdir().unwrap();
        let stager = stager(dir.path());

        let mut staged = stager.stage("nota.jpg").await.unwrap();
        staged.write_chunk(b"partial").await.unwrap();
        let path = staged.path().to_path_buf();
        assert!(path.exists());

        drop(staged);
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_dropped_upload_before_persist_removes_tmp_file() {
        let dir = tempfile::tempdir().unwrap();
        let stager = stager(dir.path());

        let mut staged = stager.stage("nota.jpg").await.unwrap();
        staged.write_chunk(b"jpeg").await.unwrap();
        let upload = staged.finish().await.unwrap();
        let path = upload.path().to_path_buf();
        assert!(path.exists());

        drop(upload);
        assert!(!path.exists());
    }

    #[test]
    fn test_long_original_name_is_truncated() {
        let long = format!("{}.png", "a".repeat(300));
        let name = FileStager::generate_name(&long);
        assert!(name.len() <= 255);
        assert!(name.ends_with(".png"));

        let accented = format!("{}.jpeg", "é".repeat(200));
        let base = truncate_base_name(&accented);
        assert!(base.len() <= MAX_BASE_NAME_BYTES);
        assert!(base.ends_with(".jpeg"));

        // 확장자가 너무 길면 통째로 자름
        let odd = format!("nota.{}", "x".repeat(300));
        assert_eq!(truncate_base_name(&odd).len(), MAX_BASE_NAME_BYTES);

        assert_eq!(truncate_base_name("recibo.png"), "recibo.png");
    }

    #[tokio::test]
    async fn test_stage_accepts_long_original_name() {
        let dir = tempfile::tempdir().unwrap();
        let stager = stager(dir.path());

        let staged = stager
            .stage(&format!("{}.png", "recibo".repeat(60)))
            .await
            .unwrap();
        assert!(staged.filename().ends_with(".png"));
        assert!(staged.path().exists());
    }
}
