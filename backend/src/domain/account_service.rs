//! Account domain service: registration, verification, login, password
//! reset, profile, and balance.
//!
//! Verification codes and reset token fingerprints live in the key-value
//! cache; emails go through the [`Mailer`] port and a delivery failure never
//! rolls back the state change that triggered it.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use mockable::Clock;
use tracing::{info, warn};

use crate::domain::ports::{
    AccountBalanceRepository, AccountCommand, AccountQuery, ConfirmPasswordResetRequest,
    KeyValueCache, LoginService, Mailer, PasswordHasher, RegisterRequest, SecretGenerator,
    UserRepository,
};
use crate::domain::{
    AccountBalance, EmailAddress, EmailMessage, Error, LoginCredentials, Money, Notifications,
    PASSWORD_RESET_TTL, PasswordResetToken, PlainPassword, ProfileUpdate, Registration,
    RegistrationValidationError, User, UserId, VERIFICATION_CODE_TTL, VerificationCode,
    password_reset_key, verification_code_key,
};

use super::validation::FieldViolation;

/// Balance credited to every new account unless configured otherwise.
pub const DEFAULT_SIGNUP_BONUS: Money = Money::from_cents(5_000);

/// Tunables for [`AccountService`].
#[derive(Debug, Clone)]
pub struct AccountSettings {
    /// Credit granted to every new account.
    pub signup_bonus: Money,
    /// Lifetime of an email verification code.
    pub verification_code_ttl: Duration,
    /// Lifetime of a password reset token.
    pub password_reset_ttl: Duration,
    /// Sender address for account emails.
    pub notifications: Notifications,
}

impl Default for AccountSettings {
    fn default() -> Self {
        Self {
            signup_bonus: DEFAULT_SIGNUP_BONUS,
            verification_code_ttl: VERIFICATION_CODE_TTL,
            password_reset_ttl: PASSWORD_RESET_TTL,
            notifications: Notifications::default(),
        }
    }
}

/// Port bundle required by [`AccountService`].
#[derive(Clone)]
pub struct AccountPorts {
    /// Account storage.
    pub users: Arc<dyn UserRepository>,
    /// Balance storage.
    pub balances: Arc<dyn AccountBalanceRepository>,
    /// Verification codes and reset tokens.
    pub cache: Arc<dyn KeyValueCache>,
    /// Verification and reset emails.
    pub mailer: Arc<dyn Mailer>,
    /// Password hashing.
    pub hasher: Arc<dyn PasswordHasher>,
    /// Code and token generation.
    pub secrets: Arc<dyn SecretGenerator>,
    /// Timestamps.
    pub clock: Arc<dyn Clock>,
}

/// Account service implementing the account driving ports.
#[derive(Clone)]
pub struct AccountService {
    ports: AccountPorts,
    settings: AccountSettings,
}

impl AccountService {
    /// Create a service over the given ports.
    pub fn new(ports: AccountPorts, settings: AccountSettings) -> Self {
        Self { ports, settings }
    }

    async fn require_user(&self, user_id: &UserId) -> Result<User, Error> {
        self.ports
            .users
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| Error::not_found("User not found."))
    }

    async fn deliver(&self, message: EmailMessage) {
        if let Err(err) = self.ports.mailer.send(&message).await {
            warn!(error = %err, to = %message.to, subject = %message.subject, "email not accepted");
        }
    }

    async fn issue_verification_code(&self, user: &User) -> Result<(), Error> {
        let code = self.ports.secrets.verification_code();
        self.ports
            .cache
            .set(
                &verification_code_key(&user.id),
                code.as_ref(),
                self.settings.verification_code_ttl,
            )
            .await?;
        let message = self.settings.notifications.verification_code(
            &user.email,
            &code,
            self.settings.verification_code_ttl,
        );
        self.deliver(message).await;
        Ok(())
    }

    async fn ensure_unique(&self, registration: &Registration) -> Result<(), Error> {
        if self
            .ports
            .users
            .find_by_username(registration.username.as_ref())
            .await?
            .is_some()
        {
            return Err(Error::conflict("A user with that username already exists."));
        }
        if self
            .ports
            .users
            .find_by_email(&registration.email)
            .await?
            .is_some()
        {
            return Err(Error::conflict("A user with that email already exists."));
        }
        Ok(())
    }

    async fn find_by_raw_email(&self, raw: &str) -> Result<Option<User>, Error> {
        let Ok(email) = EmailAddress::new(raw) else {
            return Ok(None);
        };
        Ok(self.ports.users.find_by_email(&email).await?)
    }
}

fn map_registration_error(err: RegistrationValidationError) -> Error {
    let code = match &err {
        RegistrationValidationError::PasswordMismatch => "password_mismatch",
        RegistrationValidationError::Password(_) => "password_too_short",
        RegistrationValidationError::User(_) => "invalid_value",
    };
    FieldViolation::new(err.field(), code, err.to_string()).into()
}

#[async_trait]
impl AccountCommand for AccountService {
    async fn register(&self, request: RegisterRequest) -> Result<UserId, Error> {
        let registration = Registration::try_from_parts(
            &request.username,
            &request.email,
            &request.password,
            &request.confirm_password,
            request.role,
        )
        .map_err(map_registration_error)?;
        self.ensure_unique(&registration).await?;

        let password_hash = self.ports.hasher.hash(&registration.password)?;
        let user = User {
            id: UserId::random(),
            username: registration.username,
            email: registration.email,
            password_hash,
            role: registration.role,
            is_verified: false,
            is_admin: false,
            bio: None,
            profile_picture: None,
            created_at: self.ports.clock.utc(),
        };
        self.ports
            .users
            .create(&user, self.settings.signup_bonus)
            .await?;
        info!(user_id = %user.id, role = %user.role, "user registered");

        self.issue_verification_code(&user).await?;
        Ok(user.id)
    }

    async fn verify_email(&self, user_id: &UserId, code: &str) -> Result<(), Error> {
        let key = verification_code_key(user_id);
        let Some(cached) = self.ports.cache.get(&key).await? else {
            return Err(Error::invalid_request(
                "The verification code has expired or is invalid.",
            ));
        };
        let matches = VerificationCode::parse(code).is_ok_and(|submitted| submitted.as_ref() == cached);
        if !matches {
            return Err(Error::invalid_request("Incorrect verification code."));
        }

        let user = self.require_user(user_id).await?;
        if !self.ports.users.mark_verified(user_id).await? {
            return Err(Error::not_found("User not found."));
        }
        info!(user_id = %user_id, "email verified");
        self.deliver(self.settings.notifications.verification_success(&user.email))
            .await;
        self.ports.cache.delete(&key).await?;
        Ok(())
    }

    async fn request_password_reset(&self, email: &str) -> Result<(), Error> {
        let Some(user) = self.find_by_raw_email(email).await? else {
            return Err(Error::invalid_request(
                "There is no user registered with this email.",
            ));
        };
        let token = self.ports.secrets.reset_token();
        self.ports
            .cache
            .set(
                &password_reset_key(&user.id),
                &token.fingerprint(),
                self.settings.password_reset_ttl,
            )
            .await?;
        self.deliver(self.settings.notifications.password_reset(&user.email, &token))
            .await;
        info!(user_id = %user.id, "password reset requested");
        Ok(())
    }

    async fn confirm_password_reset(
        &self,
        request: ConfirmPasswordResetRequest,
    ) -> Result<(), Error> {
        let Some(user) = self.find_by_raw_email(&request.email).await? else {
            return Err(Error::invalid_request("Invalid email."));
        };
        let key = password_reset_key(&user.id);
        let submitted = PasswordResetToken::new(request.token.trim());
        let stored = self.ports.cache.get(&key).await?;
        if stored.as_deref() != Some(submitted.fingerprint().as_str()) {
            return Err(Error::invalid_request("Invalid or expired token."));
        }
        let password = PlainPassword::new(&request.new_password).map_err(|err| {
            Error::from(FieldViolation::new(
                "new_password",
                "password_too_short",
                err.to_string(),
            ))
        })?;

        let password_hash = self.ports.hasher.hash(&password)?;
        if !self
            .ports
            .users
            .update_password(&user.id, &password_hash)
            .await?
        {
            return Err(Error::invalid_request("Invalid email."));
        }
        self.ports.cache.delete(&key).await?;
        info!(user_id = %user.id, "password reset completed");
        self.deliver(self.settings.notifications.password_reset_success(&user.email))
            .await;
        Ok(())
    }

    async fn update_profile(&self, user_id: &UserId, update: ProfileUpdate) -> Result<User, Error> {
        self.ports
            .users
            .update_profile(user_id, &update)
            .await?
            .ok_or_else(|| Error::not_found("User not found."))
    }

    async fn top_up_balance(
        &self,
        user_id: &UserId,
        amount: Money,
    ) -> Result<AccountBalance, Error> {
        if !amount.is_positive() {
            return Err(FieldViolation::new(
                "amount",
                "not_positive",
                "Amount must be greater than zero.",
            )
            .into());
        }
        if !amount.fits_storage() {
            return Err(FieldViolation::new(
                "amount",
                "too_many_digits",
                "Ensure that there are no more than 10 digits in total.",
            )
            .into());
        }
        let balance = self
            .ports
            .balances
            .credit(user_id, amount, self.ports.clock.utc())
            .await?
            .ok_or_else(|| Error::not_found("Account balance not found."))?;
        info!(user_id = %user_id, amount = %amount, balance = %balance.balance, "balance topped up");
        Ok(balance)
    }
}

#[async_trait]
impl AccountQuery for AccountService {
    async fn fetch_profile(&self, user_id: &UserId) -> Result<User, Error> {
        self.require_user(user_id).await
    }

    async fn fetch_balance(&self, user_id: &UserId) -> Result<AccountBalance, Error> {
        self.ports
            .balances
            .find(user_id)
            .await?
            .ok_or_else(|| Error::not_found("Account balance not found."))
    }
}

#[async_trait]
impl LoginService for AccountService {
    async fn authenticate(&self, credentials: &LoginCredentials) -> Result<UserId, Error> {
        let Some(user) = self
            .ports
            .users
            .find_by_username(credentials.username())
            .await?
        else {
            return Err(Error::unauthorized("invalid credentials"));
        };
        if !self
            .ports
            .hasher
            .verify(credentials.password(), &user.password_hash)?
        {
            return Err(Error::unauthorized("invalid credentials"));
        }
        if !user.is_verified {
            return Err(Error::invalid_request("Your email is not verified."));
        }
        Ok(user.id)
    }
}

#[cfg(test)]
#[path = "account_service_tests.rs"]
mod tests;
