//! 업로드 검증 정책.

use refund_core::UploadConfig;

use crate::error::ValidationIssues;

/// 임시 디렉토리에 기록된 업로드 파일 정보.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedFile {
    /// 생성된 파일 이름
    pub filename: String,
    /// 클라이언트가 보낸 MIME 타입
    pub mimetype: String,
    /// 바이트 크기
    pub size: u64,
}

/// 업로드 허용 정책.
#[derive(Debug, Clone)]
pub struct UploadPolicy {
    pub max_file_size: u64,
    pub accepted_types: Vec<String>,
}

impl UploadPolicy {
    pub fn from_config(config: &UploadConfig) -> Self {
        Self {
            max_file_size: config.max_file_size,
            accepted_types: config.accepted_types.clone(),
        }
    }

    /// 파일이 정책을 만족하는지 검사.
    ///
    /// 이름, MIME 타입, 크기를 모두 검사하고 위반 사항을 필드별로 모읍니다.
    pub fn validate(&self, file: &UploadedFile) -> Result<(), ValidationIssues> {
        let mut issues = ValidationIssues::default();

        if file.filename.is_empty() {
            issues.push_field("filename", "Arquivo é obrigatório");
        }

        if !self.accepted_types.iter().any(|t| t == &file.mimetype) {
            issues.push_field(
                "mimetype",
                format!(
                    "Formato de arquivo inválido, formatos permitidos: {}",
                    self.accepted_types.join(",")
                ),
            );
        }

        if file.size == 0 {
            issues.push_field("size", "Arquivo vazio");
        } else if file.size > self.max_file_size {
            issues.push_field(
                "size",
                format!(
                    "Arquivo excede o tamanho máximo de {} MB",
                    format_megabytes(self.max_file_size)
                ),
            );
        }

        if issues.is_empty() {
            Ok(())
        } else {
            Err(issues)
        }
    }
}

fn format_megabytes(bytes: u64) -> String {
    const MB: u64 = 1024 * 1024;
    if bytes % MB == 0 {
        (bytes / MB).to_string()
    } else {
        format!("{:.2}", bytes as f64 / MB as f64)
    }
}
