use std::cmp::Ordering;
use std::str::FromStr;

use super::criteria::SortKey;
use super::engine::{collate, Queryable};
use crate::board::analytics::OrganizationActivity;
use crate::board::domain::{Applicant, ApplicationWithJob, Job};
use crate::board::error::ValidationError;

/// Sort orders offered by the public job browser.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JobSort {
    #[default]
    DateDesc,
    DateAsc,
    TitleAsc,
    TitleDesc,
}

impl SortKey for JobSort {
    fn as_str(self) -> &'static str {
        match self {
            Self::DateDesc => "date-desc",
            Self::DateAsc => "date-asc",
            Self::TitleAsc => "title-asc",
            Self::TitleDesc => "title-desc",
        }
    }
}

impl FromStr for JobSort {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "date-desc" => Ok(Self::DateDesc),
            "date-asc" => Ok(Self::DateAsc),
            "title-asc" => Ok(Self::TitleAsc),
            "title-desc" => Ok(Self::TitleDesc),
            other => Err(ValidationError::UnknownSortKey(other.to_string())),
        }
    }
}

/// Sort orders shared by the review tables (applications, organizations, applicants).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RecordSort {
    #[default]
    DateDesc,
    DateAsc,
    NameAsc,
    NameDesc,
}

impl SortKey for RecordSort {
    fn as_str(self) -> &'static str {
        match self {
            Self::DateDesc => "date-desc",
            Self::DateAsc => "date-asc",
            Self::NameAsc => "name-asc",
            Self::NameDesc => "name-desc",
        }
    }
}

impl FromStr for RecordSort {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "date-desc" => Ok(Self::DateDesc),
            "date-asc" => Ok(Self::DateAsc),
            "name-asc" => Ok(Self::NameAsc),
            "name-desc" => Ok(Self::NameDesc),
            other => Err(ValidationError::UnknownSortKey(other.to_string())),
        }
    }
}

impl Queryable for Job {
    type Sort = JobSort;

    const FILTERS: &'static [&'static str] = &["department", "type", "location", "status"];

    fn search_fields(&self) -> Vec<&str> {
        vec![
            self.title.as_str(),
            self.department.as_str(),
            self.location.as_str(),
        ]
    }

    fn filter_value(&self, name: &str) -> Option<&str> {
        match name {
            "department" => Some(self.department.as_str()),
            "type" => Some(self.job_type.as_str()),
            "location" => Some(self.location.as_str()),
            "status" => Some(self.status.as_str()),
            _ => None,
        }
    }

    fn compare(&self, other: &Self, sort: JobSort) -> Ordering {
        match sort {
            JobSort::DateDesc => other.posted_date.cmp(&self.posted_date),
            JobSort::DateAsc => self.posted_date.cmp(&other.posted_date),
            JobSort::TitleAsc => collate(&self.title, &other.title),
            JobSort::TitleDesc => collate(&other.title, &self.title),
        }
    }
}

impl Queryable for ApplicationWithJob {
    type Sort = RecordSort;

    const FILTERS: &'static [&'static str] = &["status", "department", "job_id"];

    fn search_fields(&self) -> Vec<&str> {
        vec![
            self.application.full_name.as_str(),
            self.application.email.as_str(),
            self.job.title.as_str(),
        ]
    }

    fn filter_value(&self, name: &str) -> Option<&str> {
        match name {
            "status" => Some(self.application.status.as_str()),
            "department" => Some(self.job.department.as_str()),
            "job_id" => Some(self.job.id.as_str()),
            _ => None,
        }
    }

    fn compare(&self, other: &Self, sort: RecordSort) -> Ordering {
        let (a, b) = (&self.application, &other.application);
        match sort {
            RecordSort::DateDesc => b.applied_at.cmp(&a.applied_at),
            RecordSort::DateAsc => a.applied_at.cmp(&b.applied_at),
            RecordSort::NameAsc => collate(&a.full_name, &b.full_name),
            RecordSort::NameDesc => collate(&b.full_name, &a.full_name),
        }
    }
}

impl Queryable for OrganizationActivity {
    type Sort = RecordSort;

    const FILTERS: &'static [&'static str] = &["status"];

    fn search_fields(&self) -> Vec<&str> {
        let org = &self.organization;
        vec![
            org.company_name.as_str(),
            org.email.as_str(),
            org.contact_person.as_str(),
        ]
    }

    fn filter_value(&self, name: &str) -> Option<&str> {
        match name {
            "status" => Some(self.organization.status.as_str()),
            _ => None,
        }
    }

    fn compare(&self, other: &Self, sort: RecordSort) -> Ordering {
        let (a, b) = (&self.organization, &other.organization);
        match sort {
            RecordSort::DateDesc => b.created_at.cmp(&a.created_at),
            RecordSort::DateAsc => a.created_at.cmp(&b.created_at),
            RecordSort::NameAsc => collate(&a.company_name, &b.company_name),
            RecordSort::NameDesc => collate(&b.company_name, &a.company_name),
        }
    }
}

impl Queryable for Applicant {
    type Sort = RecordSort;

    const FILTERS: &'static [&'static str] = &[];

    fn search_fields(&self) -> Vec<&str> {
        vec![self.email.as_str(), self.full_name.as_str()]
    }

    fn filter_value(&self, _name: &str) -> Option<&str> {
        None
    }

    fn compare(&self, other: &Self, sort: RecordSort) -> Ordering {
        match sort {
            RecordSort::DateDesc => other.first_applied_at.cmp(&self.first_applied_at),
            RecordSort::DateAsc => self.first_applied_at.cmp(&other.first_applied_at),
            RecordSort::NameAsc => collate(&self.full_name, &other.full_name),
            RecordSort::NameDesc => collate(&other.full_name, &self.full_name),
        }
    }
}
