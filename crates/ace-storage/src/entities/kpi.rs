use sea_orm::entity::prelude::*;

// default_email_to / default_email_cc 以 JSON 数组字符串存储。
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "kpis")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub name: String,
    pub domain: String,
    pub description: Option<String>,
    pub alert_table_name: String,
    pub default_email_to: String,
    pub default_email_cc: String,
    pub default_subject: String,
    pub default_body: String,
    pub default_footer: String,
    pub is_favorite: bool,
    pub identifier: Option<String>,
    pub severity_tagging: bool,
    pub owner_department_id: Option<String>,
    pub icon: Option<String>,
    pub severity: Option<String>,
    pub status: Option<String>,
    pub is_automation_enabled: Option<bool>,
    pub automation_time: Option<String>,
    pub ai_prompt: Option<String>,
    pub is_active: bool,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::department::Entity",
        from = "Column::OwnerDepartmentId",
        to = "super::department::Column::Id"
    )]
    Department,
}

impl Related<super::department::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Department.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
