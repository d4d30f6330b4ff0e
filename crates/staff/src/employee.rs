use serde::{Deserialize, Serialize};

use bloomshop_core::{DomainError, DomainResult, Entity, Money, UserId};

use crate::user::User;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkingSchedule {
    Day,
    Evening,
}

/// Payroll record of a staff member. One per staff user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmployeeProfile {
    user: UserId,
    wage: Money,
    /// Running total; only ever grows through commission credits.
    salary: Money,
    working_schedule: Option<WorkingSchedule>,
    comment: Option<String>,
}

impl EmployeeProfile {
    /// Profile for a freshly created user, or `None` for clients.
    ///
    /// Called explicitly by the user-registration workflow.
    pub fn provision(user: &User) -> Option<Self> {
        if !user.is_employee() {
            return None;
        }
        Some(Self {
            user: user.id_typed(),
            wage: Money::zero(),
            salary: Money::zero(),
            working_schedule: None,
            comment: None,
        })
    }

    pub fn user(&self) -> UserId {
        self.user
    }

    pub fn wage(&self) -> Money {
        self.wage
    }

    pub fn salary(&self) -> Money {
        self.salary
    }

    pub fn working_schedule(&self) -> Option<WorkingSchedule> {
        self.working_schedule
    }

    pub fn comment(&self) -> Option<&str> {
        self.comment.as_deref()
    }

    /// Add a commission to the running salary.
    pub fn credit(&mut self, commission: Money) -> DomainResult<()> {
        if commission.amount().is_sign_negative() && !commission.is_zero() {
            return Err(DomainError::validation(
                "commission",
                "commission credits cannot be negative",
            ));
        }
        self.salary = self.salary.checked_add(commission)?;
        Ok(())
    }

    pub fn set_wage(&mut self, wage: Money) -> DomainResult<()> {
        if wage.amount().is_sign_negative() && !wage.is_zero() {
            return Err(DomainError::validation("wage", "wage cannot be negative"));
        }
        self.wage = wage;
        Ok(())
    }

    pub fn set_schedule(&mut self, schedule: Option<WorkingSchedule>, comment: Option<String>) {
        self.working_schedule = schedule;
        self.comment = comment;
    }
}

impl Entity for EmployeeProfile {
    type Id = UserId;
    const KIND: &'static str = "employee profile";

    fn id(&self) -> &Self::Id {
        &self.user
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::user::NewUser;
    use bloomshop_auth::Role;

    fn user(role: Role) -> User {
        User::register(NewUser {
            id: UserId::new(),
            username: "aibek".to_string(),
            phone: "+996700123456".to_string(),
            role,
            is_superuser: false,
        })
        .unwrap()
    }

    #[test]
    fn staff_get_a_zeroed_profile() {
        let florist = user(Role::Florist);
        let profile = EmployeeProfile::provision(&florist).unwrap();
        assert_eq!(profile.user(), florist.id_typed());
        assert_eq!(profile.salary(), Money::zero());
        assert_eq!(profile.wage(), Money::zero());
    }

    #[test]
    fn clients_get_no_profile() {
        assert!(EmployeeProfile::provision(&user(Role::Client)).is_none());
    }

    #[test]
    fn credits_accumulate() {
        let mut profile = EmployeeProfile::provision(&user(Role::Courier)).unwrap();
        profile.credit("5.25".parse().unwrap()).unwrap();
        profile.credit("4.75".parse().unwrap()).unwrap();
        assert_eq!(profile.salary(), Money::from_int(10).unwrap());
    }

    #[test]
    fn negative_credit_is_rejected() {
        let mut profile = EmployeeProfile::provision(&user(Role::Courier)).unwrap();
        assert!(profile.credit("-1".parse().unwrap()).is_err());
        assert_eq!(profile.salary(), Money::zero());
    }
}
