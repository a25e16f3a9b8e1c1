use crate::{
    Operation,
    emitter::{Flow, MAX_PAGE_SIZE, RowEmitter},
    error::EngineError,
    paginate::{ListRequest, fetch_page, paginate},
};
use model::{core::qualifier::Quals, pagination::cursor::Cursor};
use tracing::debug;

/// How child rows are scoped by a parent: the qualifier column that names
/// the parent and how to read that id off a parent row.
pub struct ParentScope<P> {
    pub column: &'static str,
    pub id_of: fn(&P) -> Option<String>,
}

impl<P> ParentScope<P> {
    pub const fn new(column: &'static str, id_of: fn(&P) -> Option<String>) -> Self {
        ParentScope { column, id_of }
    }

    /// Id of `parent` when its children should be listed under `quals`.
    ///
    /// A parent without an id is never admitted. A non-empty qualifier on
    /// [`Self::column`] admits only the parent with exactly that id.
    pub fn admit(&self, quals: &Quals, parent: &P) -> Option<String> {
        let id = (self.id_of)(parent)?;
        match quals.get_str(self.column) {
            Some(wanted) if wanted != id => None,
            _ => Some(id),
        }
    }
}

/// Lists every parent, then lists the children of each admitted parent
/// through the same emitter.
///
/// Parent rows are not emitted and do not consume the row budget. Parents
/// that do not match the qualifier are skipped without a child call. The
/// walk ends as soon as the emitter stops, including between parents.
#[allow(clippy::too_many_arguments)]
pub async fn chain<P, R, F>(
    client: &P::Client,
    parent_op: &Operation,
    parents: &P,
    scope: &ParentScope<P::Item>,
    quals: &Quals,
    child_op: &Operation,
    mut child_request: F,
    emitter: &mut RowEmitter<'_, R::Item>,
) -> Result<Flow, EngineError>
where
    P: ListRequest,
    R: ListRequest<Client = P::Client>,
    F: FnMut(&P::Item, String) -> R + Send,
{
    let mut cursor = Cursor::Start;

    loop {
        if emitter.should_stop() {
            return Ok(Flow::Stop);
        }

        let page = fetch_page(client, parent_op, parents, &cursor, MAX_PAGE_SIZE).await?;

        for parent in page.rows {
            let Some(parent_id) = scope.admit(quals, &parent) else {
                debug!(operation = %child_op, column = scope.column, "parent skipped by qualifier");
                continue;
            };

            let request = child_request(&parent, parent_id);
            if paginate(client, child_op, &request, emitter).await?.is_stop() {
                return Ok(Flow::Stop);
            }
        }

        match page.next {
            Some(next) if next != cursor => cursor = next,
            _ => return Ok(Flow::Continue),
        }
    }
}
