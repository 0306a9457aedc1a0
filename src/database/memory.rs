use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::models::{
    Invitation, Membership, MembershipSummary, NewInvitation, NewOrganization, NewProblem, Organization,
    Problem, ProblemOption,
};
use super::store::{Store, StoreError, UNIQUE_VIOLATION};
use crate::types::{InvitationStatus, Role};

#[derive(Default)]
struct Tables {
    organizations: Vec<Organization>,
    memberships: Vec<Membership>,
    invitations: Vec<Invitation>,
    problems: Vec<Problem>,
    problem_options: Vec<ProblemOption>,
}

/// In-process `Store` for local development and tests.
///
/// Every operation holds the table lock for its whole duration, which gives the
/// composite operations the same all-or-nothing behaviour as the Postgres transactions.
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Options of a problem in position order
    pub async fn problem_options(&self, problem_id: Uuid) -> Vec<ProblemOption> {
        let tables = self.tables.read().await;
        let mut options: Vec<ProblemOption> = tables
            .problem_options
            .iter()
            .filter(|o| o.problem_id == problem_id)
            .cloned()
            .collect();
        options.sort_by_key(|o| o.position);
        options
    }

    pub async fn membership_count(&self, organization_id: Uuid) -> usize {
        let tables = self.tables.read().await;
        tables
            .memberships
            .iter()
            .filter(|m| m.organization_id == organization_id)
            .count()
    }
}

fn newest_first<T, F>(mut rows: Vec<T>, created_at: F) -> Vec<T>
where
    F: Fn(&T) -> DateTime<Utc>,
{
    rows.sort_by(|a, b| created_at(b).cmp(&created_at(a)));
    rows
}

#[async_trait]
impl Store for MemoryStore {
    async fn health_check(&self) -> Result<(), StoreError> {
        Ok(())
    }

    async fn find_organization_by_slug(&self, slug: &str) -> Result<Option<Organization>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables.organizations.iter().find(|o| o.slug == slug).cloned())
    }

    async fn create_organization_with_admin(
        &self,
        new: NewOrganization,
    ) -> Result<(Organization, Membership), StoreError> {
        let mut tables = self.tables.write().await;

        if tables.organizations.iter().any(|o| o.slug == new.slug) {
            return Err(StoreError::Database {
                message: "duplicate key value violates unique constraint \"organizations_slug_key\"".to_string(),
                code: Some(UNIQUE_VIOLATION.to_string()),
                details: Some(format!("Key (slug)=({}) already exists.", new.slug)),
                hint: None,
            });
        }

        let now = Utc::now();
        let organization = Organization {
            id: Uuid::new_v4(),
            name: new.name,
            slug: new.slug,
            created_by: new.created_by,
            created_at: now,
        };
        let membership = Membership {
            id: Uuid::new_v4(),
            organization_id: organization.id,
            user_id: new.created_by,
            role: Role::Admin,
            created_at: now,
        };

        tables.organizations.push(organization.clone());
        tables.memberships.push(membership.clone());
        Ok((organization, membership))
    }

    async fn find_membership(
        &self,
        organization_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<Membership>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables
            .memberships
            .iter()
            .find(|m| m.organization_id == organization_id && m.user_id == user_id)
            .cloned())
    }

    async fn list_memberships_for_user(&self, user_id: Uuid) -> Result<Vec<MembershipSummary>, StoreError> {
        let tables = self.tables.read().await;
        let mut memberships: Vec<&Membership> = tables.memberships.iter().filter(|m| m.user_id == user_id).collect();
        memberships.sort_by_key(|m| m.created_at);

        Ok(memberships
            .into_iter()
            .map(|m| MembershipSummary {
                role: m.role,
                organization_slug: tables
                    .organizations
                    .iter()
                    .find(|o| o.id == m.organization_id)
                    .map(|o| o.slug.clone()),
            })
            .collect())
    }

    async fn create_invitation(&self, new: NewInvitation) -> Result<Invitation, StoreError> {
        let mut tables = self.tables.write().await;
        let invitation = Invitation {
            id: Uuid::new_v4(),
            organization_id: new.organization_id,
            email: new.email,
            role: new.role,
            token: Uuid::new_v4(),
            status: InvitationStatus::Pending,
            created_by: new.created_by,
            created_at: Utc::now(),
            accepted_at: None,
            accepted_by: None,
        };
        tables.invitations.push(invitation.clone());
        Ok(invitation)
    }

    async fn accept_invitation(
        &self,
        id: Uuid,
        user_id: Uuid,
        accepted_at: DateTime<Utc>,
    ) -> Result<Membership, StoreError> {
        let mut tables = self.tables.write().await;

        let index = tables
            .invitations
            .iter()
            .position(|i| i.id == id)
            .ok_or_else(|| StoreError::NotFound(format!("Invitation {} not found", id)))?;

        let invitation = tables.invitations[index].clone();
        if !invitation.is_pending() {
            return Err(StoreError::Conflict(format!("Invitation is {}", invitation.status)));
        }
        if tables
            .memberships
            .iter()
            .any(|m| m.organization_id == invitation.organization_id && m.user_id == user_id)
        {
            return Err(StoreError::Conflict("User is already a member of this organization".to_string()));
        }

        let membership = Membership {
            id: Uuid::new_v4(),
            organization_id: invitation.organization_id,
            user_id,
            role: invitation.role,
            created_at: accepted_at,
        };

        let stored = &mut tables.invitations[index];
        stored.status = InvitationStatus::Accepted;
        stored.accepted_at = Some(accepted_at);
        stored.accepted_by = Some(user_id);
        tables.memberships.push(membership.clone());

        Ok(membership)
    }

    async fn list_invitations(&self, organization_id: Uuid) -> Result<Vec<Invitation>, StoreError> {
        let tables = self.tables.read().await;
        let rows = tables
            .invitations
            .iter()
            .filter(|i| i.organization_id == organization_id)
            .cloned()
            .collect();
        Ok(newest_first(rows, |i: &Invitation| i.created_at))
    }

    async fn list_pending_invitations_for_email(&self, email: &str) -> Result<Vec<Invitation>, StoreError> {
        let email = email.to_lowercase();
        let tables = self.tables.read().await;
        let rows = tables
            .invitations
            .iter()
            .filter(|i| i.is_pending() && i.email.to_lowercase() == email)
            .cloned()
            .collect();
        Ok(newest_first(rows, |i: &Invitation| i.created_at))
    }

    async fn create_problem(
        &self,
        organization_id: Uuid,
        created_by: Uuid,
        problem: &NewProblem,
    ) -> Result<Problem, StoreError> {
        let mut tables = self.tables.write().await;

        if !tables.organizations.iter().any(|o| o.id == organization_id) {
            return Err(StoreError::Database {
                message: "insert or update on table \"problems\" violates foreign key constraint".to_string(),
                code: Some("23503".to_string()),
                details: None,
                hint: None,
            });
        }

        let now = Utc::now();
        let created = Problem {
            id: Uuid::new_v4(),
            organization_id,
            title: problem.title.clone(),
            prompt: Some(problem.prompt.clone()),
            problem_type: problem.problem_type(),
            answer_text: problem.answer_text().map(str::to_string),
            explanation: problem.explanation.clone(),
            created_by,
            created_at: now,
            updated_at: now,
        };

        let options = problem.options().iter().enumerate().map(|(position, option)| ProblemOption {
            id: Uuid::new_v4(),
            organization_id,
            problem_id: created.id,
            label: option.label.clone(),
            position: position as i32,
            is_correct: option.is_correct,
        });
        tables.problem_options.extend(options);
        tables.problems.push(created.clone());

        Ok(created)
    }

    async fn list_problems(&self, organization_id: Uuid) -> Result<Vec<Problem>, StoreError> {
        let tables = self.tables.read().await;
        let rows = tables
            .problems
            .iter()
            .filter(|p| p.organization_id == organization_id)
            .cloned()
            .collect();
        Ok(newest_first(rows, |p: &Problem| p.created_at))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::models::{NewOption, ProblemBody};

    fn new_org(slug: &str, created_by: Uuid) -> NewOrganization {
        NewOrganization {
            name: "Acme".to_string(),
            slug: slug.to_string(),
            created_by,
        }
    }

    #[tokio::test]
    async fn duplicate_slug_reports_unique_violation() {
        let store = MemoryStore::new();
        let user = Uuid::new_v4();
        store.create_organization_with_admin(new_org("acme", user)).await.unwrap();

        let err = store.create_organization_with_admin(new_org("acme", user)).await.unwrap_err();
        match err {
            StoreError::Database { code, .. } => assert_eq!(code.as_deref(), Some(UNIQUE_VIOLATION)),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn choice_problem_options_keep_their_order() {
        let store = MemoryStore::new();
        let user = Uuid::new_v4();
        let (org, _) = store.create_organization_with_admin(new_org("acme", user)).await.unwrap();

        let problem = NewProblem {
            title: "Capital".to_string(),
            prompt: "Capital of France?".to_string(),
            explanation: None,
            body: ProblemBody::SingleChoice {
                options: vec![
                    NewOption { label: "Paris".to_string(), is_correct: true },
                    NewOption { label: "Lyon".to_string(), is_correct: false },
                ],
            },
        };
        let created = store.create_problem(org.id, user, &problem).await.unwrap();

        let options = store.problem_options(created.id).await;
        assert_eq!(options.len(), 2);
        assert_eq!(options[0].label, "Paris");
        assert_eq!(options[0].position, 0);
        assert!(options[0].is_correct);
        assert_eq!(options[1].position, 1);
    }

    #[tokio::test]
    async fn accepting_twice_is_a_conflict() {
        let store = MemoryStore::new();
        let admin = Uuid::new_v4();
        let student = Uuid::new_v4();
        let (org, _) = store.create_organization_with_admin(new_org("acme", admin)).await.unwrap();
        let invite = store
            .create_invitation(NewInvitation {
                organization_id: org.id,
                email: "s@example.com".to_string(),
                role: Role::Student,
                created_by: admin,
            })
            .await
            .unwrap();

        store.accept_invitation(invite.id, student, Utc::now()).await.unwrap();
        let err = store.accept_invitation(invite.id, student, Utc::now()).await.unwrap_err();
        assert!(matches!(err, StoreError::Conflict(_)));
        assert_eq!(store.membership_count(org.id).await, 2);
    }

    #[tokio::test]
    async fn pending_invitations_match_email_case_insensitively() {
        let store = MemoryStore::new();
        let admin = Uuid::new_v4();
        let (org, _) = store.create_organization_with_admin(new_org("acme", admin)).await.unwrap();
        store
            .create_invitation(NewInvitation {
                organization_id: org.id,
                email: "Élève@Example.com".to_string(),
                role: Role::Student,
                created_by: admin,
            })
            .await
            .unwrap();

        let found = store.list_pending_invitations_for_email("éLÈVE@example.COM").await.unwrap();
        assert_eq!(found.len(), 1);
        assert!(store
            .list_pending_invitations_for_email("eleve@example.com")
            .await
            .unwrap()
            .is_empty());
    }
}
