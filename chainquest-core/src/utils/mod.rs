pub mod subject_locks;
