pub mod core {
    pub mod data_type;
    pub mod qualifier;
    pub mod value;
}

pub mod pagination {
    pub mod cursor;
    pub mod page;
}

pub mod records {
    pub mod row;
}
