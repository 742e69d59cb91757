use crate::state_machine::RequestStatus;

use super::QueryError;

/// Optional equality filters combined with logical AND.
///
/// An absent filter matches any value for that field. `search` is matched
/// case-insensitively against the review comments and the request payload.
#[derive(Debug, Clone, Default)]
pub struct RequestFilter {
    pub status: Option<RequestStatus>,
    pub subject_type: Option<String>,
    pub subject_id: Option<String>,
    pub requested_by: Option<String>,
    pub reviewed_by: Option<String>,
    pub search: Option<String>,
}

impl RequestFilter {
    pub fn is_empty(&self) -> bool {
        self.status.is_none()
            && self.subject_type.is_none()
            && self.subject_id.is_none()
            && self.requested_by.is_none()
            && self.reviewed_by.is_none()
            && self.search.is_none()
    }

    /// Build a WHERE clause with numbered placeholders starting at
    /// `$first_param`, returning the clause and the bind values in order.
    /// All bound values are text; empty strings are treated as absent.
    pub fn to_sql(&self, first_param: usize) -> (String, Vec<String>) {
        let mut conditions = Vec::new();
        let mut binds: Vec<String> = Vec::new();
        let mut param = first_param;

        let mut push_eq = |field: &str, value: &Option<String>,
                           conditions: &mut Vec<String>,
                           binds: &mut Vec<String>| {
            if let Some(value) = value {
                if !value.is_empty() {
                    conditions.push(format!("{field} = ${param}"));
                    binds.push(value.clone());
                    param += 1;
                }
            }
        };

        push_eq(
            "status",
            &self.status.map(|s| s.to_string()),
            &mut conditions,
            &mut binds,
        );
        push_eq("subject_type", &self.subject_type, &mut conditions, &mut binds);
        push_eq("subject_id", &self.subject_id, &mut conditions, &mut binds);
        push_eq("requested_by", &self.requested_by, &mut conditions, &mut binds);
        push_eq("reviewed_by", &self.reviewed_by, &mut conditions, &mut binds);

        if let Some(search) = &self.search {
            if !search.is_empty() {
                conditions.push(format!(
                    "(comments ILIKE ${param} OR payload::text ILIKE ${param})"
                ));
                binds.push(format!("%{search}%"));
            }
        }

        if conditions.is_empty() {
            (String::new(), binds)
        } else {
            (format!(" WHERE {}", conditions.join(" AND ")), binds)
        }
    }
}

/// Columns a list query may sort by. A whitelist rather than caller-supplied
/// SQL keeps the dynamic query injection-safe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortField {
    #[default]
    CreatedAt,
    UpdatedAt,
    DecisionDate,
    Status,
}

impl SortField {
    pub fn column(&self) -> &'static str {
        match self {
            Self::CreatedAt => "created_at",
            Self::UpdatedAt => "updated_at",
            Self::DecisionDate => "decision_date",
            Self::Status => "status",
        }
    }

    pub fn parse(s: &str) -> Result<Self, QueryError> {
        match s {
            "created_at" => Ok(Self::CreatedAt),
            "updated_at" => Ok(Self::UpdatedAt),
            "decision_date" => Ok(Self::DecisionDate),
            "status" => Ok(Self::Status),
            _ => Err(QueryError::InvalidSortField {
                field: s.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    pub fn keyword(&self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }

    pub fn parse(s: &str) -> Result<Self, QueryError> {
        match s.to_ascii_uppercase().as_str() {
            "ASC" => Ok(Self::Asc),
            "DESC" => Ok(Self::Desc),
            _ => Err(QueryError::InvalidSortOrder {
                order: s.to_string(),
            }),
        }
    }
}

/// Sort specification; defaults to creation time, newest first
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SortSpec {
    pub field: SortField,
    pub order: SortOrder,
}

impl SortSpec {
    pub fn new(field: SortField, order: SortOrder) -> Self {
        Self { field, order }
    }

    pub fn to_sql(&self) -> String {
        format!(" ORDER BY {} {}", self.field.column(), self.order.keyword())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_filter_produces_no_where_clause() {
        let filter = RequestFilter::default();
        let (clause, binds) = filter.to_sql(1);
        assert!(clause.is_empty());
        assert!(binds.is_empty());
    }

    #[test]
    fn test_filters_combine_with_and() {
        let filter = RequestFilter {
            status: Some(RequestStatus::Submitted),
            requested_by: Some("alice".to_string()),
            ..Default::default()
        };
        let (clause, binds) = filter.to_sql(1);
        assert_eq!(clause, " WHERE status = $1 AND requested_by = $2");
        assert_eq!(binds, vec!["submitted".to_string(), "alice".to_string()]);
    }

    #[test]
    fn test_placeholder_numbering_starts_at_first_param() {
        let filter = RequestFilter {
            subject_type: Some("asset".to_string()),
            ..Default::default()
        };
        let (clause, _) = filter.to_sql(3);
        assert_eq!(clause, " WHERE subject_type = $3");
    }

    #[test]
    fn test_search_matches_comments_and_payload() {
        let filter = RequestFilter {
            search: Some("disposal".to_string()),
            ..Default::default()
        };
        let (clause, binds) = filter.to_sql(1);
        assert_eq!(
            clause,
            " WHERE (comments ILIKE $1 OR payload::text ILIKE $1)"
        );
        assert_eq!(binds, vec!["%disposal%".to_string()]);
    }

    #[test]
    fn test_empty_string_filters_ignored() {
        let filter = RequestFilter {
            subject_id: Some(String::new()),
            ..Default::default()
        };
        let (clause, binds) = filter.to_sql(1);
        assert!(clause.is_empty());
        assert!(binds.is_empty());
    }

    #[test]
    fn test_sort_whitelist() {
        assert_eq!(SortField::parse("created_at").unwrap(), SortField::CreatedAt);
        assert_eq!(
            SortField::parse("decision_date").unwrap(),
            SortField::DecisionDate
        );
        assert!(SortField::parse("payload; DROP TABLE").is_err());
        assert_eq!(SortOrder::parse("asc").unwrap(), SortOrder::Asc);
        assert!(SortOrder::parse("sideways").is_err());
    }

    #[test]
    fn test_default_sort_is_newest_first() {
        assert_eq!(SortSpec::default().to_sql(), " ORDER BY created_at DESC");
    }
}
