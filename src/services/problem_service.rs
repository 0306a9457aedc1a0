use super::access::TenantContext;
use crate::auth::AuthUser;
use crate::database::models::{NewProblem, Problem};
use crate::database::Store;
use crate::error::ApiError;

/// Write a problem and its options in one step
pub async fn create(
    store: &dyn Store,
    ctx: &TenantContext,
    user: &AuthUser,
    problem: &NewProblem,
) -> Result<Problem, ApiError> {
    let created = store.create_problem(ctx.organization.id, user.id, problem).await?;
    tracing::info!(
        "Created {} problem {} in '{}' with {} options",
        created.problem_type,
        created.id,
        ctx.organization.slug,
        problem.options().len()
    );
    Ok(created)
}

pub async fn list_for_tenant(store: &dyn Store, ctx: &TenantContext) -> Result<Vec<Problem>, ApiError> {
    Ok(store.list_problems(ctx.organization.id).await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::models::{NewOption, NewOrganization, ProblemBody};
    use crate::database::MemoryStore;
    use crate::services::access::load_admin_context;
    use crate::testing::user;
    use crate::types::ProblemType;

    fn single_choice() -> NewProblem {
        NewProblem {
            title: "Capital".to_string(),
            prompt: "Capital of France?".to_string(),
            explanation: None,
            body: ProblemBody::SingleChoice {
                options: vec![
                    NewOption {
                        label: "Paris".to_string(),
                        is_correct: true,
                    },
                    NewOption {
                        label: "Lyon".to_string(),
                        is_correct: false,
                    },
                ],
            },
        }
    }

    #[tokio::test]
    async fn admin_creates_problem_with_ordered_options() {
        let store = MemoryStore::new();
        let owner = user("owner@example.com");
        store
            .create_organization_with_admin(NewOrganization {
                name: "Acme".to_string(),
                slug: "acme".to_string(),
                created_by: owner.id,
            })
            .await
            .unwrap();
        let ctx = load_admin_context(&store, "acme", &owner).await.unwrap();

        let problem = create(&store, &ctx, &owner, &single_choice()).await.unwrap();
        assert_eq!(problem.problem_type, ProblemType::SingleChoice);
        assert_eq!(problem.answer_text, None);

        let options = store.problem_options(problem.id).await;
        let labels: Vec<_> = options.iter().map(|o| (o.label.as_str(), o.position)).collect();
        assert_eq!(labels, vec![("Paris", 0), ("Lyon", 1)]);

        let listed = list_for_tenant(&store, &ctx).await.unwrap();
        assert_eq!(listed.len(), 1);
    }
}
