mod tree_construction;
