//! 페이지네이션 계산.

use serde::{Deserialize, Serialize};

/// 기본 페이지 번호.
pub const DEFAULT_PAGE: u32 = 1;
/// 기본 페이지 크기.
pub const DEFAULT_PER_PAGE: u32 = 10;

/// 페이지 요청 (1부터 시작).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u32,
    pub per_page: u32,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            per_page: DEFAULT_PER_PAGE,
        }
    }
}

impl PageRequest {
    /// 새 페이지 요청. 0은 1로 올립니다.
    pub fn new(page: u32, per_page: u32) -> Self {
        Self {
            page: page.max(1),
            per_page: per_page.max(1),
        }
    }

    /// 건너뛸 레코드 수.
    pub fn offset(&self) -> i64 {
        (i64::from(self.page) - 1) * i64::from(self.per_page)
    }

    /// 가져올 레코드 수.
    pub fn limit(&self) -> i64 {
        i64::from(self.per_page)
    }
}

/// 목록 응답의 페이지 정보.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub page: u32,
    pub per_page: u32,
    pub total_records: i64,
    /// 레코드가 없어도 최소 1
    pub total_pages: i64,
}

impl Pagination {
    /// 전체 레코드 수로부터 페이지 정보 계산.
    pub fn new(request: PageRequest, total_records: i64) -> Self {
        let per_page = i64::from(request.per_page.max(1));
        let total_records = total_records.max(0);
        let total_pages = ((total_records + per_page - 1) / per_page).max(1);

        Self {
            page: request.page,
            per_page: request.per_page,
            total_records,
            total_pages,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_total_pages_rounds_up() {
        let p = Pagination::new(PageRequest::new(1, 10), 21);
        assert_eq!(p.total_pages, 3);

        let p = Pagination::new(PageRequest::new(2, 10), 20);
        assert_eq!(p.total_pages, 2);

        let p = Pagination::new(PageRequest::new(1, 3), 1);
        assert_eq!(p.total_pages, 1);
    }

    #[test]
    fn test_total_pages_minimum_one() {
        let p = Pagination::new(PageRequest::default(), 0);
        assert_eq!(p.total_records, 0);
        assert_eq!(p.total_pages, 1);
    }

    #[test]
    fn test_total_pages_matches_ceil_division() {
        for per_page in 1..=7u32 {
            for n in 0..=50i64 {
                let p = Pagination::new(PageRequest::new(1, per_page), n);
                let expected = ((n as f64) / f64::from(per_page)).ceil().max(1.0) as i64;
                assert_eq!(p.total_pages, expected, "n={n} per_page={per_page}");
            }
        }
    }

    #[test]
    fn test_offset() {
        assert_eq!(PageRequest::new(1, 10).offset(), 0);
        assert_eq!(PageRequest::new(3, 10).offset(), 20);
        assert_eq!(PageRequest::new(0, 0), PageRequest::new(1, 1));
    }

    #[test]
    fn test_serialization_camel_case() {
        let json = serde_json::to_value(Pagination::new(PageRequest::default(), 5)).unwrap();
        assert_eq!(json["perPage"], 10);
        assert_eq!(json["totalRecords"], 5);
        assert_eq!(json["totalPages"], 1);
    }
}
