use serde::Deserialize;

use bloomshop_auth::{Capabilities, Requester, permissions};
use bloomshop_catalog::Favorite;
use bloomshop_core::{Money, UserId};
use bloomshop_staff::{EmployeeProfile, NewUser, User, WorkingSchedule};

use super::{ShopService, load};
use crate::error::ServiceError;
use crate::store::ShopStore;

/// Partial update of an employee profile. `None` leaves a field unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct EmployeeProfileUpdate {
    pub wage: Option<Money>,
    pub working_schedule: Option<WorkingSchedule>,
    pub comment: Option<String>,
}

impl<S: ShopStore> ShopService<S> {
    /// Persist a new user and, for staff, provision its employee profile in
    /// the same transaction.
    ///
    /// Clients may sign themselves up; staff accounts need `staff.manage`.
    #[tracing::instrument(skip(self, input), fields(user_id = %input.id, role = %input.role), err)]
    pub fn register_user(
        &self,
        input: NewUser,
        requester: Requester,
    ) -> Result<(User, Option<EmployeeProfile>), ServiceError> {
        let caps = Capabilities::resolve(&requester);
        let user = User::register(input)?;
        if user.is_employee() {
            caps.require(&permissions::STAFF_MANAGE)?;
        }

        let profile = self.run("register_user", |tx| {
            if tx.get::<User>(user.id_typed())?.is_some() {
                return Err(ServiceError::InvalidState(format!(
                    "user {} already exists",
                    user.id_typed()
                )));
            }
            let username_taken = tx
                .list::<User>()?
                .iter()
                .any(|u| u.username() == user.username());
            if username_taken {
                return Err(ServiceError::Validation {
                    field: "username".to_string(),
                    message: format!("username '{}' is taken", user.username()),
                });
            }

            tx.put(user.clone())?;
            let profile = EmployeeProfile::provision(&user);
            if let Some(profile) = &profile {
                tx.put(profile.clone())?;
            }
            Ok(profile)
        })?;

        tracing::info!(
            user_id = %user.id_typed(),
            employee = profile.is_some(),
            "user registered"
        );
        Ok((user, profile))
    }

    /// Delete a user together with its employee profile and favorites.
    #[tracing::instrument(skip(self), err)]
    pub fn delete_user(&self, user_id: UserId, requester: Requester) -> Result<(), ServiceError> {
        let caps = Capabilities::resolve(&requester);
        if caps.user_id() != Some(user_id) {
            caps.require(&permissions::STAFF_MANAGE)?;
        }

        self.run("delete_user", |tx| {
            let _: User = load(tx, user_id)?;
            tx.delete::<User>(user_id)?;
            if tx.get::<EmployeeProfile>(user_id)?.is_some() {
                tx.delete::<EmployeeProfile>(user_id)?;
            }
            let favorites: Vec<_> = tx
                .list::<Favorite>()?
                .into_iter()
                .filter(|f| f.belongs_to(user_id))
                .map(|f| f.id)
                .collect();
            for id in favorites {
                tx.delete::<Favorite>(id)?;
            }
            Ok(())
        })?;

        tracing::info!(user_id = %user_id, "user deleted");
        Ok(())
    }

    #[tracing::instrument(skip(self, update), err)]
    pub fn update_employee_profile(
        &self,
        user_id: UserId,
        update: EmployeeProfileUpdate,
        requester: Requester,
    ) -> Result<EmployeeProfile, ServiceError> {
        let caps = Capabilities::resolve(&requester);
        caps.require(&permissions::STAFF_MANAGE)?;

        self.run("update_employee_profile", |tx| {
            let mut profile: EmployeeProfile = load(tx, user_id)?;
            if let Some(wage) = update.wage {
                profile.set_wage(wage)?;
            }
            if update.working_schedule.is_some() || update.comment.is_some() {
                let schedule = update.working_schedule.or(profile.working_schedule());
                let comment = update
                    .comment
                    .clone()
                    .or_else(|| profile.comment().map(str::to_string));
                profile.set_schedule(schedule, comment);
            }
            tx.put(profile.clone())?;
            Ok(profile)
        })
    }

    pub fn get_user(&self, user_id: UserId) -> Result<User, ServiceError> {
        self.query(|tx| load(tx, user_id))
    }

    /// Own profile, or any profile for staff managers.
    pub fn get_employee_profile(
        &self,
        user_id: UserId,
        requester: Requester,
    ) -> Result<EmployeeProfile, ServiceError> {
        let caps = Capabilities::resolve(&requester);
        if caps.user_id() != Some(user_id) {
            caps.require(&permissions::STAFF_MANAGE)?;
        }
        self.query(|tx| load(tx, user_id))
    }
}
