use super::request::QueryParams;
use crate::api::RestError;

pub const FILTER_PARAM: &str = "filter";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterField {
    Name,
    ContentUrl,
}

impl FilterField {
    fn parse(field: &str) -> Option<Self> {
        match field {
            "name" => Some(FilterField::Name),
            "contentUrl" => Some(FilterField::ContentUrl),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FilterField::Name => "name",
            FilterField::ContentUrl => "contentUrl",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterClause {
    pub field: FilterField,
    pub value: String,
}

/// `filter=field:eq:value[,field:eq:value]`; all clauses must match.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Filter {
    pub clauses: Vec<FilterClause>,
}

impl Filter {
    pub fn parse(expression: &str) -> Result<Self, RestError> {
        let clauses = expression
            .split(',')
            .filter(|clause| !clause.trim().is_empty())
            .map(parse_clause)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { clauses })
    }

    pub fn from_query(query: &QueryParams) -> Result<Self, RestError> {
        match query.get(FILTER_PARAM) {
            Some(expression) => Self::parse(expression),
            None => Ok(Self::default()),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    pub fn fields(&self) -> impl Iterator<Item = FilterField> + '_ {
        self.clauses.iter().map(|clause| clause.field)
    }

    /// `value_of` returns the item's value for a field, `None` when unset.
    pub fn matches<'a>(&self, value_of: impl Fn(FilterField) -> Option<&'a str>) -> bool {
        self.clauses
            .iter()
            .all(|clause| value_of(clause.field) == Some(clause.value.as_str()))
    }
}

fn parse_clause(clause: &str) -> Result<FilterClause, RestError> {
    let mut pieces = clause.splitn(3, ':');
    let (field, operator, value) = match (pieces.next(), pieces.next(), pieces.next()) {
        (Some(field), Some(operator), Some(value)) => (field.trim(), operator.trim(), value),
        _ => return Err(invalid_filter(format!("Malformed filter expression '{}'", clause))),
    };
    if operator != "eq" {
        return Err(invalid_filter(format!(
            "Unsupported filter operator '{}'",
            operator
        )));
    }
    let field = FilterField::parse(field)
        .ok_or_else(|| invalid_filter(format!("Unsupported filter field '{}'", field)))?;
    Ok(FilterClause {
        field,
        value: value.to_string(),
    })
}

pub fn invalid_filter(detail: String) -> RestError {
    RestError::new(400, 0, "Bad Request", detail)
}
