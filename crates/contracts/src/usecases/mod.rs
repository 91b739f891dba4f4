pub mod u401_bulk_import;
