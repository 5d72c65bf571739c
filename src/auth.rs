//! Per-login-attempt credential state machine. A flow value starts at
//! `LoggedOut` and is stepped by caller submissions; a failed step leaves
//! the flow where it was and reports an error. `Authenticated` is a
//! terminal signal the caller consumes immediately to unlock a scoped
//! view; there is no session or token concept.

use crate::model::Registry;
use rand::Rng;

/// Fixed administrator credential pair carried over from the source
/// deployment. Plaintext and hardcoded; a real deployment needs a
/// credential store in front of this.
pub const ADMIN_IDENTITY: &str = "admin@gmail.com";
pub const ADMIN_SECRET: &str = "12345";

pub fn admin_login(identity: &str, secret: &str) -> bool {
    identity == ADMIN_IDENTITY && secret == ADMIN_SECRET
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    RollNotFound,
    DobRequired,
    InvalidPassword,
    InvalidCredentials,
    EmailNotFound,
    CodeMismatch,
    ConfirmationMismatch,
    FlowOutOfStep,
}

impl AuthError {
    pub fn code(&self) -> &'static str {
        match self {
            AuthError::RollNotFound => "roll_not_found",
            AuthError::DobRequired => "dob_required",
            AuthError::InvalidPassword | AuthError::InvalidCredentials => "invalid_credentials",
            AuthError::EmailNotFound => "email_not_found",
            AuthError::CodeMismatch => "code_mismatch",
            AuthError::ConfirmationMismatch => "confirmation_mismatch",
            AuthError::FlowOutOfStep => "flow_out_of_step",
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            AuthError::RollNotFound => "Roll Number not found in this section",
            AuthError::DobRequired => "First login requires DOB (YYYY-MM-DD) as passkey",
            AuthError::InvalidPassword => "Invalid Password",
            AuthError::InvalidCredentials => "Invalid Credentials",
            AuthError::EmailNotFound => "Email not found in system",
            AuthError::CodeMismatch => "Invalid OTP",
            AuthError::ConfirmationMismatch => "Passwords do not match",
            AuthError::FlowOutOfStep => "No login step is pending",
        }
    }
}

/// Scope supplied with a login attempt. Students carry no scope beyond
/// their own record; staff roles must match their full scope tuple and
/// never learn which part of it failed.
#[derive(Debug, Clone, PartialEq)]
pub enum LoginRequest {
    Student {
        identity: String,
        secret: String,
    },
    Hod {
        identity: String,
        secret: String,
        dept_id: String,
    },
    Advisor {
        identity: String,
        secret: String,
        dept_id: String,
        year: String,
        section: String,
    },
    Staff {
        identity: String,
        secret: String,
        dept_id: String,
        section: String,
        subject: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginFlow {
    LoggedOut,
    FirstTimeSetup { roll: String },
    OtpVerify { roll: String, code: String },
    ResetCredential { roll: String },
    Authenticated { roll: Option<String> },
}

impl Default for LoginFlow {
    fn default() -> Self {
        LoginFlow::LoggedOut
    }
}

fn identity_matches(input: &str, email: &str, name: &str) -> bool {
    let input = input.trim();
    input.eq_ignore_ascii_case(email) || input.eq_ignore_ascii_case(name)
}

impl LoginFlow {
    pub fn status(&self) -> &'static str {
        match self {
            LoginFlow::LoggedOut => "loggedOut",
            LoginFlow::FirstTimeSetup { .. } => "firstTimeSetup",
            LoginFlow::OtpVerify { .. } => "otpVerify",
            LoginFlow::ResetCredential { .. } => "resetCredential",
            LoginFlow::Authenticated { .. } => "authenticated",
        }
    }

    /// Entry transition from LoggedOut.
    pub fn submit(&self, registry: &Registry, request: &LoginRequest) -> Result<LoginFlow, AuthError> {
        if !matches!(self, LoginFlow::LoggedOut) {
            return Err(AuthError::FlowOutOfStep);
        }
        match request {
            LoginRequest::Student { identity, secret } => {
                let Some(student) = registry.find_student(identity.trim()) else {
                    return Err(AuthError::RollNotFound);
                };
                match &student.password {
                    None => {
                        // First login: the stored date of birth is the passkey.
                        if *secret == student.dob {
                            Ok(LoginFlow::FirstTimeSetup {
                                roll: student.id.clone(),
                            })
                        } else {
                            Err(AuthError::DobRequired)
                        }
                    }
                    Some(password) => {
                        if secret == password {
                            Ok(LoginFlow::Authenticated {
                                roll: Some(student.id.clone()),
                            })
                        } else {
                            Err(AuthError::InvalidPassword)
                        }
                    }
                }
            }
            LoginRequest::Hod {
                identity,
                secret,
                dept_id,
            } => {
                let hit = registry.hod_accounts.iter().any(|h| {
                    identity_matches(identity, &h.email, &h.name)
                        && h.password == *secret
                        && h.dept_id == *dept_id
                });
                if hit {
                    Ok(LoginFlow::Authenticated { roll: None })
                } else {
                    Err(AuthError::InvalidCredentials)
                }
            }
            LoginRequest::Advisor {
                identity,
                secret,
                dept_id,
                year,
                section,
            } => {
                let hit = registry.advisor_accounts.iter().any(|fa| {
                    identity_matches(identity, &fa.email, &fa.name)
                        && fa.password == *secret
                        && fa.dept_id == *dept_id
                        && fa.year == *year
                        && fa.section == *section
                });
                if hit {
                    Ok(LoginFlow::Authenticated { roll: None })
                } else {
                    Err(AuthError::InvalidCredentials)
                }
            }
            LoginRequest::Staff {
                identity,
                secret,
                dept_id,
                section,
                subject,
            } => {
                let hit = registry.staff_assignments.iter().any(|sa| {
                    identity_matches(identity, &sa.email, &sa.staff_name)
                        && sa.password == *secret
                        && sa.department_id == *dept_id
                        && sa.section == *section
                        && sa.subject == *subject
                });
                if hit {
                    Ok(LoginFlow::Authenticated { roll: None })
                } else {
                    Err(AuthError::InvalidCredentials)
                }
            }
        }
    }

    /// FirstTimeSetup -> Authenticated. Persists email and password on the
    /// record captured at login, after which the password path applies.
    pub fn complete_setup(
        &self,
        registry: &mut Registry,
        email: &str,
        new_password: &str,
        confirm: &str,
    ) -> Result<LoginFlow, AuthError> {
        let LoginFlow::FirstTimeSetup { roll } = self else {
            return Err(AuthError::FlowOutOfStep);
        };
        if new_password != confirm {
            return Err(AuthError::ConfirmationMismatch);
        }
        let Some(student) = registry.find_student_mut(roll) else {
            return Err(AuthError::RollNotFound);
        };
        student.email = Some(email.to_string());
        student.password = Some(new_password.to_string());
        Ok(LoginFlow::Authenticated {
            roll: Some(roll.clone()),
        })
    }

    /// LoggedOut -> OtpVerify. Generates a 4-digit recovery code bound to
    /// the student whose stored email matches.
    pub fn request_recovery(
        &self,
        registry: &Registry,
        email: &str,
    ) -> Result<LoginFlow, AuthError> {
        if !matches!(self, LoginFlow::LoggedOut) {
            return Err(AuthError::FlowOutOfStep);
        }
        let hit = registry.students.iter().find(|s| {
            s.email
                .as_ref()
                .map(|e| e.eq_ignore_ascii_case(email.trim()))
                .unwrap_or(false)
        });
        let Some(student) = hit else {
            return Err(AuthError::EmailNotFound);
        };
        let code = rand::thread_rng().gen_range(1000..10000).to_string();
        Ok(LoginFlow::OtpVerify {
            roll: student.id.clone(),
            code,
        })
    }

    /// OtpVerify -> ResetCredential on exact string equality.
    pub fn verify_code(&self, entered: &str) -> Result<LoginFlow, AuthError> {
        let LoginFlow::OtpVerify { roll, code } = self else {
            return Err(AuthError::FlowOutOfStep);
        };
        if entered != code {
            return Err(AuthError::CodeMismatch);
        }
        Ok(LoginFlow::ResetCredential { roll: roll.clone() })
    }

    /// ResetCredential -> Authenticated, persisting the new password on
    /// the id captured when the code was issued.
    pub fn reset_password(
        &self,
        registry: &mut Registry,
        new_password: &str,
        confirm: &str,
    ) -> Result<LoginFlow, AuthError> {
        let LoginFlow::ResetCredential { roll } = self else {
            return Err(AuthError::FlowOutOfStep);
        };
        if new_password != confirm {
            return Err(AuthError::ConfirmationMismatch);
        }
        let Some(student) = registry.find_student_mut(roll) else {
            return Err(AuthError::RollNotFound);
        };
        student.password = Some(new_password.to_string());
        Ok(LoginFlow::Authenticated {
            roll: Some(roll.clone()),
        })
    }
}
