//! Export filter assembly
//!
//! Filters are predicates in the Bulk API query language. Each optional input
//! contributes one clause and the clauses are joined with `AND`. Apart from date
//! and activity-type validation nothing here can fail.

use crate::error::{Error, Result};
use chrono::NaiveDate;

/// Activity types the Bulk API can export
pub const ACTIVITY_TYPES: [&str; 9] = [
    "EmailSend",
    "EmailOpen",
    "EmailClickthrough",
    "Bounceback",
    "FormSubmit",
    "Subscribe",
    "Unsubscribe",
    "WebVisit",
    "PageView",
];

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Parse a `YYYY-MM-DD` date supplied for flag `field`
pub fn check_date(field: &str, value: &str) -> Result<NaiveDate> {
    // chrono accepts unpadded months and days; the flag format does not
    if value.len() != 10 {
        return Err(Error::validation(
            field,
            format!("{value:?} is not a YYYY-MM-DD date"),
        ));
    }
    NaiveDate::parse_from_str(value, DATE_FORMAT)
        .map_err(|e| Error::validation(field, format!("{value:?} is not a YYYY-MM-DD date: {e}")))
}

/// Parse an optional date flag
pub fn check_optional_date(field: &str, value: Option<&str>) -> Result<Option<NaiveDate>> {
    value.map(|v| check_date(field, v)).transpose()
}

/// Reject activity types the Bulk API does not export
pub fn check_activity_type(value: &str) -> Result<()> {
    if ACTIVITY_TYPES.contains(&value) {
        Ok(())
    } else {
        Err(Error::validation(
            "type",
            format!(
                "unsupported activity type {value:?}, expected one of: {}",
                ACTIVITY_TYPES.join(", ")
            ),
        ))
    }
}

/// Clauses joined with `AND`, led by the user's own predicate when given
#[derive(Debug, Default)]
struct Clauses {
    user: Option<String>,
    generated: Vec<String>,
}

impl Clauses {
    fn with_user(user: &str) -> Self {
        let user = user.trim();
        Self {
            user: (!user.is_empty()).then(|| user.to_string()),
            generated: Vec::new(),
        }
    }

    fn push(&mut self, clause: impl Into<String>) {
        self.generated.push(clause.into())
    }

    /// The user predicate is parenthesised when generated clauses follow, so an
    /// `OR` inside it cannot escape the `AND` chain
    fn join(self) -> String {
        let mut parts = Vec::with_capacity(self.generated.len() + 1);
        match self.user {
            Some(user) if !self.generated.is_empty() => parts.push(format!("({user})")),
            Some(user) => parts.push(user),
            None => {}
        }
        parts.extend(self.generated);
        parts.join(" AND ")
    }
}

fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

fn quote(value: &str) -> Result<String> {
    if value.contains('\'') {
        return Err(Error::validation(
            "filter",
            format!("{value:?} contains a single quote"),
        ));
    }
    Ok(format!("'{value}'"))
}

/// Date-range filter for one activity type
#[derive(Clone, Debug)]
pub struct ActivityFilter {
    /// One of [`ACTIVITY_TYPES`]
    pub activity_type: String,
    /// Inclusive lower bound on `CreatedAt`
    pub since: Option<NaiveDate>,
    /// Exclusive upper bound on `CreatedAt`
    pub until: Option<NaiveDate>,
}

impl ActivityFilter {
    /// The filter string, with `user` AND-ed in front when non-empty
    pub fn build(&self, user: &str) -> String {
        let mut clauses = Clauses::with_user(user);
        clauses.push(format!("'{{{{Activity.Type}}}}' = '{}'", self.activity_type));
        if let Some(since) = self.since {
            clauses.push(format!(
                "'{{{{Activity.CreatedAt}}}}' >= '{}'",
                format_date(since)
            ));
        }
        if let Some(until) = self.until {
            clauses.push(format!(
                "'{{{{Activity.CreatedAt}}}}' < '{}'",
                format_date(until)
            ));
        }
        clauses.join()
    }
}

/// Entity kind for [`EntityFilter`]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Entity {
    /// `{{Contact.*}}`
    Contact,
    /// `{{Account.*}}`
    Account,
}

impl Entity {
    fn prefix(self) -> &'static str {
        match self {
            Entity::Contact => "Contact",
            Entity::Account => "Account",
        }
    }

    fn email_field(self) -> &'static str {
        match self {
            Entity::Contact => "{{Contact.Field(C_EmailAddress)}}",
            Entity::Account => "{{Account.Field(M_EmailAddress)}}",
        }
    }
}

/// Email and date predicates for contact and account exports
#[derive(Clone, Debug)]
pub struct EntityFilter {
    /// Which entity the predicates address
    pub entity: Entity,
    /// Match any of these addresses
    pub email_addresses: Vec<String>,
    /// Created on this day
    pub created_at: Option<NaiveDate>,
    /// Created after this day
    pub created_after: Option<NaiveDate>,
    /// Updated on this day
    pub updated_at: Option<NaiveDate>,
    /// Updated after this day
    pub updated_after: Option<NaiveDate>,
}

impl EntityFilter {
    /// An empty filter for `entity`
    pub fn new(entity: Entity) -> Self {
        Self {
            entity,
            email_addresses: Vec::new(),
            created_at: None,
            created_after: None,
            updated_at: None,
            updated_after: None,
        }
    }

    /// The filter string, with `user` AND-ed in front when non-empty
    pub fn build(&self, user: &str) -> Result<String> {
        let mut clauses = Clauses::with_user(user);

        let emails: Vec<&str> = self
            .email_addresses
            .iter()
            .map(|e| e.trim())
            .filter(|e| !e.is_empty())
            .collect();
        if !emails.is_empty() {
            let field = self.entity.email_field();
            let alternatives = emails
                .iter()
                .map(|email| Ok(format!("'{field}' = {}", quote(email)?)))
                .collect::<Result<Vec<_>>>()?;
            clauses.push(format!("({})", alternatives.join(" OR ")));
        }

        let prefix = self.entity.prefix();
        self.push_day("created-at", &mut clauses, prefix, "CreatedAt", self.created_at)?;
        if let Some(after) = self.created_after {
            clauses.push(format!(
                "'{{{{{prefix}.CreatedAt}}}}' > '{}'",
                format_date(after)
            ));
        }
        self.push_day("updated-at", &mut clauses, prefix, "UpdatedAt", self.updated_at)?;
        if let Some(after) = self.updated_after {
            clauses.push(format!(
                "'{{{{{prefix}.UpdatedAt}}}}' > '{}'",
                format_date(after)
            ));
        }

        Ok(clauses.join())
    }

    /// `>= day AND < day + 1`
    fn push_day(
        &self,
        flag: &str,
        clauses: &mut Clauses,
        prefix: &str,
        column: &str,
        day: Option<NaiveDate>,
    ) -> Result<()> {
        let Some(day) = day else {
            return Ok(());
        };
        let next = day
            .succ_opt()
            .ok_or_else(|| Error::validation(flag, format!("{day} has no following day")))?;
        clauses.push(format!(
            "'{{{{{prefix}.{column}}}}}' >= '{}'",
            format_date(day)
        ));
        clauses.push(format!(
            "'{{{{{prefix}.{column}}}}}' < '{}'",
            format_date(next)
        ));
        Ok(())
    }
}
