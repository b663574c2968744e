use async_trait::async_trait;
use sqlx::PgPool;
use staybook_core::models::{Address, Enrollment, UserId};
use staybook_core::repository::{EnrollmentRepository, RepoResult};
use staybook_shared::pii::Masked;

pub struct StoreEnrollmentRepository {
    pool: PgPool,
}

impl StoreEnrollmentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

// Address columns are nullable because of the LEFT JOIN
#[derive(sqlx::FromRow)]
struct EnrollmentRow {
    id: i32,
    user_id: i32,
    name: String,
    cpf: String,
    phone: String,
    cep: Option<String>,
    street: Option<String>,
    number: Option<String>,
    neighborhood: Option<String>,
    city: Option<String>,
    state: Option<String>,
    address_detail: Option<String>,
}

impl From<EnrollmentRow> for Enrollment {
    fn from(row: EnrollmentRow) -> Self {
        let address = match (row.cep, row.street, row.number, row.neighborhood, row.city, row.state) {
            (Some(cep), Some(street), Some(number), Some(neighborhood), Some(city), Some(state)) => {
                Some(Address {
                    cep,
                    street,
                    number,
                    neighborhood,
                    city,
                    state,
                    address_detail: row.address_detail,
                })
            }
            _ => None,
        };

        Enrollment {
            id: row.id,
            user_id: row.user_id,
            name: row.name,
            cpf: Masked::new(row.cpf),
            phone: Masked::new(row.phone),
            address,
        }
    }
}

#[async_trait]
impl EnrollmentRepository for StoreEnrollmentRepository {
    async fn find_with_address_by_user(&self, user_id: UserId) -> RepoResult<Option<Enrollment>> {
        let row = sqlx::query_as::<_, EnrollmentRow>(
            r#"
            SELECT e.id, e.user_id, e.name, e.cpf, e.phone,
                   a.cep, a.street, a.number, a.neighborhood, a.city, a.state, a.address_detail
            FROM enrollments e
            LEFT JOIN addresses a ON a.enrollment_id = e.id
            WHERE e.user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Enrollment::from))
    }
}
