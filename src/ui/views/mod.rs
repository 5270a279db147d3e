mod profile;
mod project_detail;
mod project_list;

pub use profile::ProfileView;
pub use project_detail::ProjectDetailView;
pub use project_list::ProjectListView;
