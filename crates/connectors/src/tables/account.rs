use super::cell;
use crate::{
    client::{Collection, CursorStyle, DevOpsClient},
    resources::account::Account,
    transport::{ApiHost, ApiRequest},
};
use async_trait::async_trait;
use engine_core::{
    Operation,
    emitter::{Flow, RowEmitter},
    error::EngineError,
    paginate::paginate,
    table::{Column, KeyColumns, TableProvider},
    translate::{Conversion, FilterMapping, translate},
};
use model::core::{data_type::ColumnType, qualifier::Quals};
use tracing::debug;

pub const TABLE: &str = "azuredevops_account";

const LIST_ACCOUNTS: Operation = Operation::new(TABLE, "list_accounts");

const OWNER_PARAM: &str = "ownerId";
const MEMBER_PARAM: &str = "memberId";

const FILTERS: &[FilterMapping] = &[
    FilterMapping::new("owner_id", OWNER_PARAM, Conversion::Uuid),
    FilterMapping::new("member_id", MEMBER_PARAM, Conversion::Uuid),
];

type Col = Column<Account>;

pub struct AccountTable;

#[async_trait]
impl TableProvider<DevOpsClient> for AccountTable {
    type Row = Account;

    fn name(&self) -> &'static str {
        TABLE
    }

    fn description(&self) -> &'static str {
        "Azure DevOps Account"
    }

    fn columns(&self) -> Vec<Column<Account>> {
        vec![
            Col::new("account_id", ColumnType::String, "Identifier for an account.", |r, _| {
                cell(&r.account_id)
            }),
            Col::new("account_name", ColumnType::String, "Name for an account.", |r, _| {
                cell(&r.account_name)
            }),
            Col::new(
                "owner_id",
                ColumnType::String,
                "Owner the accounts were listed for.",
                |_, ctx| Ok(ctx.quals.get_str("owner_id").into()),
            ),
            Col::new(
                "member_id",
                ColumnType::String,
                "Member the accounts were listed for.",
                |_, ctx| Ok(ctx.quals.get_str("member_id").into()),
            ),
            Col::new("account_owner", ColumnType::String, "Owner of the account.", |r, _| {
                cell(&r.account_owner)
            }),
            Col::new("account_status", ColumnType::String, "Current account status.", |r, _| {
                cell(&r.account_status)
            }),
            Col::new(
                "account_type",
                ColumnType::String,
                "Type of account: Personal, Organization.",
                |r, _| cell(&r.account_type),
            ),
            Col::new("account_uri", ColumnType::String, "Uri for an account.", |r, _| {
                cell(&r.account_uri)
            }),
            Col::new("created_by", ColumnType::String, "Who created the account.", |r, _| {
                cell(&r.created_by)
            }),
            Col::new(
                "created_date",
                ColumnType::Timestamp,
                "Date account was created.",
                |r, _| cell(&r.created_date),
            ),
            Col::new("has_moved", ColumnType::Bool, "Check if the account has moved.", |r, _| {
                cell(&r.has_moved)
            }),
            Col::new(
                "last_updated_by",
                ColumnType::String,
                "Identity of last person to update the account.",
                |r, _| cell(&r.last_updated_by),
            ),
            Col::new(
                "last_updated_date",
                ColumnType::Timestamp,
                "Date account was last updated.",
                |r, _| cell(&r.last_updated_date),
            ),
            Col::new("namespace_id", ColumnType::String, "Namespace for an account.", |r, _| {
                cell(&r.namespace_id)
            }),
            Col::new(
                "new_collection_id",
                ColumnType::String,
                "New collection for an account.",
                |r, _| cell(&r.new_collection_id),
            ),
            Col::new(
                "organization_name",
                ColumnType::String,
                "Organization that created the account.",
                |r, _| cell(&r.organization_name),
            ),
            Col::new("status_reason", ColumnType::String, "Reason for current status.", |r, _| {
                cell(&r.status_reason)
            }),
            Col::new("properties", ColumnType::Json, "Extended properties.", |r, _| {
                cell(&r.properties)
            }),
            Col::new("title", ColumnType::String, "Title of the resource.", |r, _| {
                cell(&r.account_name)
            }),
        ]
    }

    fn list_keys(&self) -> KeyColumns {
        KeyColumns::AnyOf(&["owner_id", "member_id"])
    }

    /// Lists the accounts of one owner or one member. When both are given the
    /// owner wins; when neither parses there is nothing to ask for.
    async fn list(
        &self,
        client: &DevOpsClient,
        quals: &Quals,
        emitter: &mut RowEmitter<'_, Account>,
    ) -> Result<Flow, EngineError> {
        let mut params = translate(&LIST_ACCOUNTS, quals, FILTERS);
        if params.iter().any(|(name, _)| name == OWNER_PARAM) {
            params.retain(|(name, _)| name != MEMBER_PARAM);
        }
        if params.is_empty() {
            debug!(table = TABLE, "no usable owner or member filter");
            return Ok(Flow::Continue);
        }

        let request = ApiRequest::new(ApiHost::Accounts, ["_apis", "accounts"], "7.1").params(params);
        let accounts = Collection::<Account>::new(request).cursor(CursorStyle::None);
        paginate(client, &LIST_ACCOUNTS, &accounts, emitter).await
    }
}
